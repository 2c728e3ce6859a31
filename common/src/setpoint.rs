use log::{debug, info};

use crate::{context::ThermostatContext, types::SetPointState};

/// One invocation of the set-point machine.
///
/// Increase takes precedence over decrease. A request is cleared only when
/// the set-point actually moved; at a limit it stays pending. Always comes to
/// rest in [`SetPointState::Idle`].
pub fn advance(_current: SetPointState, ctx: &mut ThermostatContext) -> SetPointState {
    let requests = &ctx.requests;
    let limits = ctx.limits;

    let next = if requests.increase_requested() {
        SetPointState::AdjustUp
    } else if requests.decrease_requested() {
        SetPointState::AdjustDown
    } else {
        SetPointState::Idle
    };

    match next {
        SetPointState::AdjustUp => {
            if ctx.set_point < limits.max {
                ctx.set_point += 1;
                requests.clear_increase();
                info!("set-point raised to {}", ctx.set_point);
            } else {
                debug!("set-point at maximum {}; increase held", limits.max);
            }
        }
        SetPointState::AdjustDown => {
            if ctx.set_point > limits.min {
                ctx.set_point -= 1;
                requests.clear_decrease();
                info!("set-point lowered to {}", ctx.set_point);
            } else {
                debug!("set-point at minimum {}; decrease held", limits.min);
            }
        }
        SetPointState::Idle => {}
    }

    SetPointState::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SetPointLimits;

    fn context_at(set_point: i32) -> ThermostatContext {
        ThermostatContext::new(SetPointLimits {
            default: set_point,
            ..SetPointLimits::default()
        })
    }

    #[test]
    fn no_requests_is_a_no_op() {
        let mut ctx = context_at(20);

        for _ in 0..5 {
            assert_eq!(advance(SetPointState::Idle, &mut ctx), SetPointState::Idle);
        }

        assert_eq!(ctx.set_point(), 20);
    }

    #[test]
    fn increase_moves_one_degree_and_clears() {
        let mut ctx = context_at(20);
        ctx.requests().request_increase();

        assert_eq!(advance(SetPointState::Idle, &mut ctx), SetPointState::Idle);

        assert_eq!(ctx.set_point(), 21);
        assert!(!ctx.request_flags().increase_requested());
    }

    #[test]
    fn decrease_moves_one_degree_and_clears() {
        let mut ctx = context_at(20);
        ctx.requests().request_decrease();

        advance(SetPointState::Idle, &mut ctx);

        assert_eq!(ctx.set_point(), 19);
        assert!(!ctx.request_flags().decrease_requested());
    }

    #[test]
    fn increase_at_maximum_stays_pending() {
        let mut ctx = context_at(40);
        ctx.requests().request_increase();

        assert_eq!(advance(SetPointState::Idle, &mut ctx), SetPointState::Idle);

        assert_eq!(ctx.set_point(), 40);
        assert!(ctx.request_flags().increase_requested());
    }

    #[test]
    fn decrease_at_minimum_stays_pending() {
        let mut ctx = context_at(10);
        ctx.requests().request_decrease();

        advance(SetPointState::Idle, &mut ctx);

        assert_eq!(ctx.set_point(), 10);
        assert!(ctx.request_flags().decrease_requested());
    }

    #[test]
    fn increase_wins_when_both_pending() {
        let mut ctx = context_at(20);
        ctx.requests().request_increase();
        ctx.requests().request_decrease();

        advance(SetPointState::Idle, &mut ctx);
        assert_eq!(ctx.set_point(), 21);
        assert!(ctx.request_flags().decrease_requested());

        advance(SetPointState::Idle, &mut ctx);
        assert_eq!(ctx.set_point(), 20);
        assert!(!ctx.request_flags().decrease_requested());
    }

    #[test]
    fn held_increase_at_maximum_masks_decrease() {
        let mut ctx = context_at(40);
        ctx.requests().request_increase();
        ctx.requests().request_decrease();

        for _ in 0..3 {
            advance(SetPointState::Idle, &mut ctx);
        }

        assert_eq!(ctx.set_point(), 40);
        assert!(ctx.request_flags().increase_requested());
        assert!(ctx.request_flags().decrease_requested());
    }
}
