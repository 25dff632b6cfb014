use super::*;

fn armed(max_failures: u32) -> (RefreshTimer, u64) {
    let mut timer = RefreshTimer::new(max_failures);
    let TimerAction::Start { generation } = timer.apply(TimerEvent::TokenAcquired) else {
        panic!("expected start");
    };
    (timer, generation)
}

#[test]
fn token_acquired_starts_from_stopped() {
    let (timer, generation) = armed(3);
    assert_eq!(timer.state(), TimerState::Armed { generation });
    assert!(timer.is_current(generation));
}

#[test]
fn token_acquired_while_armed_keeps_existing_timer() {
    let (mut timer, generation) = armed(3);
    assert_eq!(timer.apply(TimerEvent::TokenAcquired), TimerAction::None);
    assert!(timer.is_current(generation));
}

#[test]
fn login_while_armed_restarts_with_new_generation() {
    let (mut timer, first) = armed(3);
    let action = timer.apply(TimerEvent::LoginSucceeded);
    assert_eq!(action, TimerAction::Restart { generation: first + 1 });
    assert!(!timer.is_current(first));
    assert!(timer.is_current(first + 1));
}

#[test]
fn token_lost_cancels_and_stops() {
    let (mut timer, generation) = armed(3);
    assert_eq!(timer.apply(TimerEvent::TokenLost), TimerAction::Cancel);
    assert_eq!(timer.state(), TimerState::Stopped);
    assert!(!timer.is_current(generation));
    assert_eq!(timer.apply(TimerEvent::TokenLost), TimerAction::None);
}

#[test]
fn teardown_cancels_armed_timer() {
    let (mut timer, _) = armed(3);
    assert_eq!(timer.apply(TimerEvent::Teardown), TimerAction::Cancel);
    assert_eq!(timer.state(), TimerState::Stopped);
}

#[test]
fn halts_after_max_consecutive_failures() {
    let (mut timer, _) = armed(3);
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::None);
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::None);
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::Cancel);
    assert_eq!(timer.state(), TimerState::Halted);
    assert_eq!(timer.failures(), 3);
    // Further failures while halted are ignored.
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::None);
}

#[test]
fn success_resets_failure_count() {
    let (mut timer, _) = armed(3);
    timer.apply(TimerEvent::ScheduledRefreshFailed);
    timer.apply(TimerEvent::ScheduledRefreshFailed);
    timer.apply(TimerEvent::RefreshSucceeded);
    assert_eq!(timer.failures(), 0);
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::None);
    assert!(matches!(timer.state(), TimerState::Armed { .. }));
}

#[test]
fn success_while_halted_does_not_rearm() {
    let (mut timer, _) = armed(1);
    timer.apply(TimerEvent::ScheduledRefreshFailed);
    assert_eq!(timer.apply(TimerEvent::RefreshSucceeded), TimerAction::None);
    assert_eq!(timer.state(), TimerState::Halted);
}

#[test]
fn login_rearms_halted_timer() {
    let (mut timer, first) = armed(1);
    timer.apply(TimerEvent::ScheduledRefreshFailed);
    assert_eq!(timer.apply(TimerEvent::LoginSucceeded), TimerAction::Start { generation: first + 1 });
    assert_eq!(timer.failures(), 0);
}

#[test]
fn zero_max_failures_is_treated_as_one() {
    let (mut timer, _) = armed(0);
    assert_eq!(timer.apply(TimerEvent::ScheduledRefreshFailed), TimerAction::Cancel);
}
