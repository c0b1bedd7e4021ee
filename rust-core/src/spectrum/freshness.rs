//! Cache freshness lattice for the analyzer's derived buffers
//!
//! Each derived representation (cartesian, polar, reconstructed time
//! domain) is tracked on its own axis. `resolve` is a pure function that
//! maps the current state and a request to the new state plus the ordered
//! recompute steps the analyzer has to run.

/// Freshness of one derived representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Does not reflect the current input
    Stale,
    /// Up to date but not yet scaled
    Raw,
    /// Up to date and scaled
    Normalized,
}

impl Freshness {
    #[inline]
    pub fn is_fresh(self) -> bool {
        self != Freshness::Stale
    }
}

/// Representation a caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Cartesian,
    Polar,
    TimeDomain,
}

/// A single recompute step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Window the input, forward FFT, apply the pass-band
    Forward,
    /// real = amp * cos(phase), imag = amp * sin(phase)
    PolarToCartesian,
    /// Scale real/imag by 2 / window_sum
    NormalizeCartesian,
    /// amp = |z|, phase = arg(z)
    CartesianToPolar,
    /// Scale amplitude by 2 / window_sum
    NormalizePolar,
    /// Inverse FFT and divide out the window
    Inverse,
    /// Scale the reconstructed block by window_sum / (2N)
    NormalizeTimeDomain,
}

/// Longest plan is a time-domain request from a fully stale state
const MAX_STEPS: usize = 4;

/// Ordered list of steps produced by `resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    steps: [Step; MAX_STEPS],
    len: usize,
}

impl Plan {
    fn new() -> Self {
        Self {
            steps: [Step::Forward; MAX_STEPS],
            len: 0,
        }
    }

    fn push(&mut self, step: Step) {
        self.steps[self.len] = step;
        self.len += 1;
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Freshness of all three derived axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheState {
    pub cartesian: Freshness,
    pub polar: Freshness,
    pub time_domain: Freshness,
}

impl CacheState {
    /// Nothing derived reflects the current input (after `set_data`)
    pub const STALE: CacheState = CacheState {
        cartesian: Freshness::Stale,
        polar: Freshness::Stale,
        time_domain: Freshness::Stale,
    };

    /// Nothing needs computing (after a resize, buffers are zeroed)
    pub const SETTLED: CacheState = CacheState {
        cartesian: Freshness::Normalized,
        polar: Freshness::Normalized,
        time_domain: Freshness::Normalized,
    };
}

/// Compute the transition for `request` from `state`
///
/// Returns the state after the plan has run and the steps to run, in
/// order. The cartesian axis is rebuilt from polar when only polar is
/// fresh, and from the raw input otherwise.
pub fn resolve(state: CacheState, request: Request) -> (CacheState, Plan) {
    let mut next = state;
    let mut plan = Plan::new();

    match request {
        Request::Cartesian => resolve_cartesian(&mut next, &mut plan),
        Request::Polar => {
            if next.polar == Freshness::Stale {
                resolve_cartesian(&mut next, &mut plan);
                plan.push(Step::CartesianToPolar);
                next.polar = next.cartesian;
            }
            if next.polar == Freshness::Raw {
                plan.push(Step::NormalizePolar);
                next.polar = Freshness::Normalized;
            }
        }
        Request::TimeDomain => {
            if next.time_domain == Freshness::Stale {
                resolve_cartesian(&mut next, &mut plan);
                plan.push(Step::Inverse);
                next.time_domain = Freshness::Raw;
            }
            if next.time_domain == Freshness::Raw {
                plan.push(Step::NormalizeTimeDomain);
                next.time_domain = Freshness::Normalized;
            }
        }
    }

    (next, plan)
}

fn resolve_cartesian(state: &mut CacheState, plan: &mut Plan) {
    if state.cartesian == Freshness::Stale {
        if state.polar == Freshness::Stale {
            plan.push(Step::Forward);
            state.cartesian = Freshness::Raw;
        } else {
            plan.push(Step::PolarToCartesian);
            state.cartesian = state.polar;
        }
    }

    if state.cartesian == Freshness::Raw {
        plan.push(Step::NormalizeCartesian);
        state.cartesian = Freshness::Normalized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Freshness::*;
    use Step::*;

    const AXIS: [Freshness; 3] = [Stale, Raw, Normalized];

    fn state(cartesian: Freshness, polar: Freshness) -> CacheState {
        CacheState {
            cartesian,
            polar,
            time_domain: Stale,
        }
    }

    fn expected_cartesian_steps(cartesian: Freshness, polar: Freshness) -> Vec<Step> {
        match (cartesian, polar) {
            (Stale, Stale) => vec![Forward, NormalizeCartesian],
            (Stale, Raw) => vec![PolarToCartesian, NormalizeCartesian],
            (Stale, Normalized) => vec![PolarToCartesian],
            (Raw, _) => vec![NormalizeCartesian],
            (Normalized, _) => vec![],
        }
    }

    #[test]
    fn test_cartesian_table() {
        for cartesian in AXIS {
            for polar in AXIS {
                let (next, plan) = resolve(state(cartesian, polar), Request::Cartesian);
                assert_eq!(
                    plan.steps(),
                    expected_cartesian_steps(cartesian, polar).as_slice(),
                    "cartesian={cartesian:?} polar={polar:?}"
                );
                assert_eq!(next.cartesian, Normalized);
                assert_eq!(next.polar, polar);
                assert_eq!(next.time_domain, Stale);
            }
        }
    }

    #[test]
    fn test_polar_table() {
        for cartesian in AXIS {
            for polar in AXIS {
                let (next, plan) = resolve(state(cartesian, polar), Request::Polar);

                let expected: Vec<Step> = match polar {
                    Stale => {
                        let mut steps = expected_cartesian_steps(cartesian, polar);
                        steps.push(CartesianToPolar);
                        steps
                    }
                    Raw => vec![NormalizePolar],
                    Normalized => vec![],
                };

                assert_eq!(
                    plan.steps(),
                    expected.as_slice(),
                    "cartesian={cartesian:?} polar={polar:?}"
                );
                assert_eq!(next.polar, Normalized);
                if polar.is_fresh() {
                    assert_eq!(next.cartesian, cartesian);
                } else {
                    assert_eq!(next.cartesian, Normalized);
                }
            }
        }
    }

    #[test]
    fn test_time_domain_table() {
        for cartesian in AXIS {
            for polar in AXIS {
                let (next, plan) = resolve(state(cartesian, polar), Request::TimeDomain);

                let mut expected = expected_cartesian_steps(cartesian, polar);
                expected.push(Inverse);
                expected.push(NormalizeTimeDomain);

                assert_eq!(
                    plan.steps(),
                    expected.as_slice(),
                    "cartesian={cartesian:?} polar={polar:?}"
                );
                assert_eq!(next.time_domain, Normalized);
                assert_eq!(next.cartesian, Normalized);
                assert_eq!(next.polar, polar);
            }
        }
    }

    #[test]
    fn test_fresh_time_domain_needs_nothing() {
        let (next, plan) = resolve(CacheState::SETTLED, Request::TimeDomain);
        assert!(plan.is_empty());
        assert_eq!(next, CacheState::SETTLED);

        let raw = CacheState {
            time_domain: Raw,
            ..CacheState::STALE
        };
        let (next, plan) = resolve(raw, Request::TimeDomain);
        assert_eq!(plan.steps(), &[NormalizeTimeDomain]);
        assert_eq!(next.cartesian, Stale);
    }

    #[test]
    fn test_longest_plan_fits() {
        let (_, plan) = resolve(CacheState::STALE, Request::TimeDomain);
        assert_eq!(plan.steps(), &[Forward, NormalizeCartesian, Inverse, NormalizeTimeDomain]);
    }
}
