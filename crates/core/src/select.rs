//! Segment selectors: which 4/4 inter-beat intervals survive in each target meter.
//!
//! Every selector looks only at the position label of an interval, never at a
//! bar index, so tracks with missing or partial bars are handled the same way
//! as clean ones. Selectors never reorder intervals.

use std::iter;

use crate::beats::Interval;

/// Intervals kept by a selector, in output order.
///
/// Each interval still carries its original 4/4 position label (or `5` for the
/// beat duplicated by the 5/4 selector); labels are rewritten later by
/// [`correct_positions`](crate::correct_positions).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    intervals: Vec<Interval>,
}

impl Selection {
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Position labels of the kept intervals, parallel to [`Self::intervals`].
    pub fn positions(&self) -> Vec<u32> {
        self.intervals.iter().map(|i| i.position).collect()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl FromIterator<Interval> for Selection {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self {
            intervals: iter.into_iter().collect(),
        }
    }
}

/// 2/4: keep beats 1 and 2 of every bar, drop 3 and 4.
pub fn two_four(intervals: &[Interval]) -> Selection {
    intervals
        .iter()
        .copied()
        .filter(|interval| interval.position < 3)
        .collect()
}

/// 3/4: drop one beat per bar, the one labelled `drop_position`.
pub fn three_four(intervals: &[Interval], drop_position: u32) -> Selection {
    intervals
        .iter()
        .copied()
        .filter(|interval| interval.position != drop_position)
        .collect()
}

/// 5/4: play beat 3 twice, labelling the copy as beat 5.
pub fn five_four(intervals: &[Interval]) -> Selection {
    intervals
        .iter()
        .flat_map(|&interval| {
            let repeat = (interval.position == 3).then(|| interval.relabel(5));
            iter::once(interval).chain(repeat)
        })
        .collect()
}

/// 6/4: every other bar loses its beats 1 and 2. See [`ToggleState::six_four`].
pub fn six_four(intervals: &[Interval]) -> Selection {
    select_with_toggle(intervals, ToggleState::six_four)
}

/// 7/4: every other beat 1 is dropped. See [`ToggleState::seven_four`].
pub fn seven_four(intervals: &[Interval]) -> Selection {
    select_with_toggle(intervals, ToggleState::seven_four)
}

/// State of the alternate-bar automata used by the 6/4 and 7/4 selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// Toggled beats are currently kept.
    #[default]
    KeepOn,
    /// Toggled beats are currently dropped.
    KeepOff,
}

/// Result of feeding one interval to a toggle automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleStep {
    /// Whether the interval is kept.
    pub keep: bool,
    /// State after the interval.
    pub next: ToggleState,
}

impl ToggleStep {
    fn new(keep: bool, next: ToggleState) -> Self {
        Self { keep, next }
    }
}

impl ToggleState {
    /// 6/4 transition.
    ///
    /// | state   | position | keep | next    |
    /// |---------|----------|------|---------|
    /// | any     | 3, 4     | yes  | same    |
    /// | KeepOn  | 1        | yes  | KeepOn  |
    /// | KeepOn  | 2        | yes  | KeepOff |
    /// | KeepOff | 1        | no   | KeepOff |
    /// | KeepOff | 2        | no   | KeepOn  |
    pub fn six_four(self, position: u32) -> ToggleStep {
        use ToggleState::*;
        match (self, position) {
            (state, p) if p > 2 => ToggleStep::new(true, state),
            (KeepOn, 2) => ToggleStep::new(true, KeepOff),
            (KeepOn, _) => ToggleStep::new(true, KeepOn),
            (KeepOff, 2) => ToggleStep::new(false, KeepOn),
            (KeepOff, _) => ToggleStep::new(false, KeepOff),
        }
    }

    /// 7/4 transition: only position 1 is toggled, every other one is dropped.
    pub fn seven_four(self, position: u32) -> ToggleStep {
        use ToggleState::*;
        match (self, position) {
            (KeepOn, 1) => ToggleStep::new(true, KeepOff),
            (KeepOff, 1) => ToggleStep::new(false, KeepOn),
            (state, _) => ToggleStep::new(true, state),
        }
    }
}

/// Run a toggle automaton over the intervals from [`ToggleState::KeepOn`],
/// returning one step per interval.
pub fn toggle_trace(
    intervals: &[Interval],
    transition: impl Fn(ToggleState, u32) -> ToggleStep,
) -> Vec<ToggleStep> {
    intervals
        .iter()
        .scan(ToggleState::default(), |state, interval| {
            let step = transition(*state, interval.position);
            *state = step.next;
            Some(step)
        })
        .collect()
}

fn select_with_toggle(
    intervals: &[Interval],
    transition: impl Fn(ToggleState, u32) -> ToggleStep,
) -> Selection {
    intervals
        .iter()
        .zip(toggle_trace(intervals, transition))
        .filter(|(_, step)| step.keep)
        .map(|(interval, _)| *interval)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ToggleState::*;

    /// One-second intervals labelled with `positions`.
    fn intervals(positions: &[u32]) -> Vec<Interval> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &p)| Interval::new(i as f64, i as f64 + 1.0, p))
            .collect()
    }

    #[test]
    fn test_two_four() {
        let selection = two_four(&intervals(&[1, 2, 3, 4, 1, 2, 3, 4]));
        assert_eq!(selection.positions(), vec![1, 2, 1, 2]);
        let starts: Vec<f64> = selection.intervals().iter().map(|i| i.start).collect();
        assert_eq!(starts, vec![0.0, 1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_three_four_default_drop() {
        let selection = three_four(&intervals(&[1, 2, 3, 4, 1, 2, 3, 4]), 4);
        assert_eq!(selection.positions(), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_three_four_custom_drop() {
        let selection = three_four(&intervals(&[1, 2, 3, 4, 1, 2]), 2);
        assert_eq!(selection.positions(), vec![1, 3, 4, 1]);
    }

    #[test]
    fn test_five_four_duplicates_in_place() {
        let source = intervals(&[1, 2, 3, 4]);
        let selection = five_four(&source);
        assert_eq!(selection.positions(), vec![1, 2, 3, 5, 4]);

        // The copy spans the same audio as beat 3
        let kept = selection.intervals();
        assert_eq!(kept[3].start, source[2].start);
        assert_eq!(kept[3].end, source[2].end);
    }

    #[test]
    fn test_six_four_trace() {
        let source = intervals(&[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
        let trace = toggle_trace(&source, ToggleState::six_four);

        let keep: Vec<bool> = trace.iter().map(|s| s.keep).collect();
        let states: Vec<ToggleState> = trace.iter().map(|s| s.next).collect();

        assert_eq!(
            keep,
            vec![true, true, true, true, false, false, true, true, true, true, true, true]
        );
        assert_eq!(
            states,
            vec![
                KeepOn, KeepOff, KeepOff, KeepOff, // bar 1 keeps 1-2, then switches off
                KeepOff, KeepOn, KeepOn, KeepOn, // bar 2 drops 1-2, dropped 2 switches on
                KeepOn, KeepOff, KeepOff, KeepOff,
            ]
        );

        assert_eq!(
            six_four(&source).positions(),
            vec![1, 2, 3, 4, 3, 4, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_six_four_trailing_partial_bar() {
        // Final beat of a 12-beat track never starts an interval
        let selection = six_four(&intervals(&[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3]));
        assert_eq!(selection.positions(), vec![1, 2, 3, 4, 3, 4, 1, 2, 3]);
    }

    #[test]
    fn test_six_four_missing_beat_two() {
        // Without a position-2 interval the toggle never flips back on
        let selection = six_four(&intervals(&[1, 2, 3, 4, 1, 3, 4, 1, 2, 3, 4]));
        assert_eq!(selection.positions(), vec![1, 2, 3, 4, 3, 4, 3, 4]);
    }

    #[test]
    fn test_seven_four_trace() {
        let source = intervals(&[1, 2, 3, 4, 1, 2, 3, 4, 1, 2]);
        let trace = toggle_trace(&source, ToggleState::seven_four);

        let keep: Vec<bool> = trace.iter().map(|s| s.keep).collect();
        assert_eq!(
            keep,
            vec![true, true, true, true, false, true, true, true, true, true]
        );
        assert_eq!(trace[0].next, KeepOff);
        assert_eq!(trace[4].next, KeepOn);
        assert_eq!(trace[8].next, KeepOff);

        assert_eq!(
            seven_four(&source).positions(),
            vec![1, 2, 3, 4, 2, 3, 4, 1, 2]
        );
    }

    #[test]
    fn test_transition_tables() {
        assert_eq!(KeepOff.six_four(3), ToggleStep::new(true, KeepOff));
        assert_eq!(KeepOn.six_four(4), ToggleStep::new(true, KeepOn));
        assert_eq!(KeepOn.six_four(1), ToggleStep::new(true, KeepOn));
        assert_eq!(KeepOn.six_four(2), ToggleStep::new(true, KeepOff));
        assert_eq!(KeepOff.six_four(1), ToggleStep::new(false, KeepOff));
        assert_eq!(KeepOff.six_four(2), ToggleStep::new(false, KeepOn));

        assert_eq!(KeepOn.seven_four(1), ToggleStep::new(true, KeepOff));
        assert_eq!(KeepOff.seven_four(1), ToggleStep::new(false, KeepOn));
        assert_eq!(KeepOff.seven_four(2), ToggleStep::new(true, KeepOff));
    }

    #[test]
    fn test_selectors_on_empty_input() {
        assert!(two_four(&[]).is_empty());
        assert!(three_four(&[], 4).is_empty());
        assert!(five_four(&[]).is_empty());
        assert!(six_four(&[]).is_empty());
        assert!(seven_four(&[]).is_empty());
    }
}
