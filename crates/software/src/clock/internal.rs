use super::{Clock, ClockDivider, DEFAULT_BPM, MIN_BPM, REFERENCE_PPQN};
use crate::parameter::Param;

/// The two factors a BPM-derived clock division is split into.
///
/// A hardware timer counts `pre` reference ticks per interrupt (its compare register is only 16 bits wide); software
/// counts `post` interrupts per logical pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dividers {
    /// Reference ticks per timer interrupt.
    pub pre: u16,
    /// Timer interrupts per pulse.
    pub post: u8,
}

impl Dividers {
    /// Computes the dividers producing [`REFERENCE_PPQN`] pulses per beat at `bpm`, from a reference clock running at
    /// `frequency` Hz. `bpm` must not be zero.
    pub fn new(frequency: u32, bpm: u16) -> Self {
        let scaled = u64::from(frequency) * 60 / u64::from(REFERENCE_PPQN);
        let divider = scaled / u64::from(bpm);
        let post = ((divider >> 16) + 1).min(u64::from(u8::MAX));
        let pre = (divider / post).min(u64::from(u16::MAX));
        Self {
            pre: pre as u16,
            post: post as u8,
        }
    }
}

/// A tempo clock producing [`REFERENCE_PPQN`] pulses per beat from a fixed-rate reference clock.
///
/// The reference (a CPU clock, or a timer's tick rate) is divided first by [`Dividers::pre`], which is meant to be
/// loaded into a hardware timer, then by [`Dividers::post`], counted here: [`Clock::clock`] is to be called from the
/// timer's interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InternalClock {
    frequency: u32,
    bpm: Param,
    dividers: Dividers,
    post: ClockDivider,
}

impl InternalClock {
    /// Constructs a clock running at [`DEFAULT_BPM`] from a reference of `frequency` Hz.
    pub fn new(frequency: u32) -> Self {
        let dividers = Dividers::new(frequency, DEFAULT_BPM);
        Self {
            frequency,
            bpm: Param::new((DEFAULT_BPM - MIN_BPM) as u8),
            dividers,
            post: ClockDivider::new(dividers.post),
        }
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        MIN_BPM + u16::from(self.bpm.value())
    }

    /// Getter.
    pub fn dividers(&self) -> Dividers {
        self.dividers
    }

    /// Sets the tempo from a raw BPM parameter, i.e., an offset above [`MIN_BPM`]. Returns the pre-divider to load into
    /// the hardware timer.
    pub fn set_bpm_parameter(&mut self, value: u8) -> u16 {
        self.bpm.set(value);
        self.update()
    }

    /// Raises the tempo by `step` BPM, stopping at the fastest tempo. Returns the new tempo.
    pub fn inc_bpm(&mut self, step: u8) -> u16 {
        self.bpm.increase(step, u8::MAX);
        self.update();
        self.bpm()
    }

    /// Lowers the tempo by `step` BPM, stopping at [`MIN_BPM`]. Returns the new tempo.
    pub fn dec_bpm(&mut self, step: u8) -> u16 {
        self.bpm.decrease(step, 0);
        self.update();
        self.bpm()
    }

    /// Recomputes both dividers and restarts the post-divider count, so no pulse is timed partly at the old tempo.
    fn update(&mut self) -> u16 {
        self.dividers = Dividers::new(self.frequency, self.bpm());
        self.post.set_divider(self.dividers.post);
        #[cfg(feature = "defmt")]
        defmt::debug!("Internal clock at {} BPM: {}", self.bpm(), self.dividers);
        self.dividers.pre
    }
}

impl Clock for InternalClock {
    fn clock(&mut self) -> bool {
        self.post.clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F_CPU: u32 = 16_000_000;

    mod dividers {
        use super::*;

        #[test]
        fn split_at_16_mhz() {
            // 16e6 * 60 / 24 / 130 = 307_692, which needs a post-divider of 5
            assert_eq!(
                Dividers {
                    pre: 61_538,
                    post: 5
                },
                Dividers::new(F_CPU, 130),
                "Expected left but got right"
            );
        }

        #[test]
        fn small_division_needs_no_post_divider() {
            // 32_768 * 60 / 24 / 130 = 630
            assert_eq!(Dividers { pre: 630, post: 1 }, Dividers::new(32_768, 130));
        }

        #[test]
        fn deterministic() {
            for bpm in MIN_BPM..=MIN_BPM + 255 {
                assert_eq!(Dividers::new(F_CPU, bpm), Dividers::new(F_CPU, bpm));
            }
        }

        #[test]
        fn product_approximates_division() {
            for bpm in MIN_BPM..=MIN_BPM + 255 {
                let exact = u64::from(F_CPU) * 60 / 24 / u64::from(bpm);
                let dividers = Dividers::new(F_CPU, bpm);
                let product = u64::from(dividers.pre) * u64::from(dividers.post);
                assert!(product <= exact, "{bpm} BPM overshoots");
                assert!(
                    exact - product < u64::from(dividers.post),
                    "{bpm} BPM loses more than rounding"
                );
            }
        }

        #[test]
        fn huge_reference_saturates() {
            let dividers = Dividers::new(u32::MAX, 1);
            assert_eq!(u8::MAX, dividers.post);
            assert_eq!(u16::MAX, dividers.pre);
        }
    }

    #[test]
    fn defaults() {
        let clock = InternalClock::new(F_CPU);
        assert_eq!(DEFAULT_BPM, clock.bpm());
        assert_eq!(Dividers::new(F_CPU, DEFAULT_BPM), clock.dividers());
    }

    #[test]
    fn set_bpm_parameter() {
        let mut clock = InternalClock::new(F_CPU);
        let pre = clock.set_bpm_parameter(75);
        assert_eq!(120, clock.bpm());
        assert_eq!(Dividers::new(F_CPU, 120).pre, pre);
    }

    #[test]
    fn inc_and_dec_clamp() {
        let mut clock = InternalClock::new(F_CPU);
        assert_eq!(MIN_BPM, clock.dec_bpm(200));
        assert_eq!(MIN_BPM, clock.dec_bpm(1));
        assert_eq!(MIN_BPM + 10, clock.inc_bpm(10));
        assert_eq!(MIN_BPM + 255, clock.inc_bpm(250));
        assert_eq!(MIN_BPM + 255, clock.inc_bpm(1));
    }

    #[test]
    fn pulses_every_post_ticks() {
        let mut clock = InternalClock::new(F_CPU);
        let post = clock.dividers().post as usize;
        let pulses = (0..post * 4).filter(|_| clock.clock()).count();
        assert_eq!(4, pulses, "Expected left but got right");
    }

    #[test]
    fn bpm_change_restarts_count() {
        let mut clock = InternalClock::new(F_CPU);
        // 5 interrupts per pulse at 130 BPM; get partway through one
        clock.clock();
        clock.clock();
        clock.set_bpm_parameter(85);
        let post = clock.dividers().post as usize;
        let first = (1..=post).find(|_| clock.clock());
        assert_eq!(Some(post), first, "Expected a full period at the new tempo");
    }
}
