//! End-to-end checks of the meter transforms through the public API.

use meteraug_core::select::toggle_trace;
use meteraug_core::{
    correct_positions, extract_intervals, splice, transform, BeatTrack, Interval, SpliceOptions,
    TargetMeter, ToggleState, TransformOptions,
};

/// `bars` bars of 4/4 at 120 BPM starting at 0.25s, plus the closing downbeat.
fn four_four(bars: usize) -> BeatTrack {
    let beats = bars * 4 + 1;
    let times = (0..beats).map(|i| 0.25 + i as f64 * 0.5).collect();
    let positions = (0..beats).map(|i| (i % 4) as u32 + 1).collect();
    BeatTrack::new(times, positions).unwrap()
}

fn kept_positions(track: &BeatTrack, target: TargetMeter) -> Vec<u32> {
    transform(track, target, &TransformOptions::default())
        .unwrap()
        .selection
        .positions()
}

#[test]
fn test_interval_extraction_shape() {
    let track = four_four(3);
    let intervals = extract_intervals(&track);
    assert_eq!(intervals.len(), track.len() - 1);
    for (i, interval) in intervals.iter().enumerate() {
        assert_eq!(interval.start, track.times()[i]);
        assert_eq!(interval.end, track.times()[i + 1]);
        assert_eq!(interval.position, track.positions()[i]);
    }
}

#[test]
fn test_two_four_scenario() {
    assert_eq!(kept_positions(&four_four(2), TargetMeter::TwoFour), vec![1, 2, 1, 2]);
}

#[test]
fn test_three_four_scenario() {
    assert_eq!(
        kept_positions(&four_four(2), TargetMeter::ThreeFour),
        vec![1, 2, 3, 1, 2, 3]
    );
}

#[test]
fn test_five_four_scenario() {
    assert_eq!(
        kept_positions(&four_four(1), TargetMeter::FiveFour),
        vec![1, 2, 3, 5, 4]
    );
}

#[test]
fn test_six_four_scenario_step_by_step() {
    let track = four_four(3);
    let intervals = extract_intervals(&track);

    let trace = toggle_trace(&intervals, ToggleState::six_four);
    let keep: Vec<bool> = trace.iter().map(|step| step.keep).collect();
    assert_eq!(
        keep,
        vec![
            true, true, true, true, // bar 1 kept whole
            false, false, true, true, // bar 2 loses beats 1 and 2
            true, true, true, true, // bar 3 kept whole
        ]
    );

    use ToggleState::{KeepOff, KeepOn};
    let states: Vec<ToggleState> = trace.iter().map(|step| step.next).collect();
    assert_eq!(
        states,
        vec![
            KeepOn, KeepOff, KeepOff, KeepOff, KeepOff, KeepOn, KeepOn, KeepOn, KeepOn, KeepOff,
            KeepOff, KeepOff,
        ]
    );

    let augmentation = transform(&track, TargetMeter::SixFour, &TransformOptions::default()).unwrap();
    assert_eq!(
        augmentation.selection.positions(),
        vec![1, 2, 3, 4, 3, 4, 1, 2, 3, 4]
    );
    assert_eq!(augmentation.positions(), vec![1, 2, 3, 4, 5, 6, 1, 2, 3, 4]);
}

#[test]
fn test_seven_four_scenario() {
    let augmentation =
        transform(&four_four(3), TargetMeter::SevenFour, &TransformOptions::default()).unwrap();
    assert_eq!(
        augmentation.selection.positions(),
        vec![1, 2, 3, 4, 2, 3, 4, 1, 2, 3, 4]
    );
    assert_eq!(
        augmentation.positions(),
        vec![1, 2, 3, 4, 5, 6, 7, 1, 2, 3, 4]
    );
}

#[test]
fn test_corrected_annotations_are_contiguous() {
    let track = four_four(4);
    for target in TargetMeter::ALL {
        let augmentation = transform(&track, target, &TransformOptions::default()).unwrap();
        let kept = augmentation.selection.intervals();

        assert_eq!(augmentation.intervals.len(), kept.len());
        assert_eq!(augmentation.intervals[0].start, track.times()[0]);
        for pair in augmentation.intervals.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-12);
        }

        let kept_total: f64 = kept.iter().map(Interval::duration).sum();
        let new_total: f64 = augmentation.intervals.iter().map(Interval::duration).sum();
        assert!((kept_total - new_total).abs() < 1e-9, "{}", target);
    }
}

#[test]
fn test_position_cycle_period() {
    let positions = [3, 4, 1, 2, 3, 4, 1, 2, 3];
    for m in 1..=7 {
        let corrected = correct_positions(&positions, m);
        assert_eq!(corrected[0], (3 - 1) % m + 1);
        for pair in corrected.windows(2) {
            assert_eq!(pair[1], pair[0] % m + 1);
        }
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let track = four_four(4);
    let sample_rate = 1000;
    let samples: Vec<f32> = (0..9000)
        .map(|i| (i as f32 * 0.05).sin() * 0.5)
        .collect();

    for target in TargetMeter::ALL {
        let first = transform(&track, target, &TransformOptions::default()).unwrap();
        let second = transform(&track, target, &TransformOptions::default()).unwrap();
        assert_eq!(first, second);

        let options = SpliceOptions::default();
        let audio_a = first.render(&samples, sample_rate, &options);
        let audio_b = splice(&samples, sample_rate, second.selection.intervals(), &options);
        assert_eq!(audio_a, audio_b);
    }
}

#[test]
fn test_unaligned_splice_length_matches_annotations() {
    let track = four_four(2);
    let sample_rate = 1000;
    let samples = vec![0.25f32; 5000];
    let plain = SpliceOptions { align_zeros: false };

    let augmentation = transform(&track, TargetMeter::TwoFour, &TransformOptions::default()).unwrap();
    let audio = augmentation.render(&samples, sample_rate, &plain);

    // quarter second lead-in plus four half-second beats
    assert_eq!(audio.len(), 250 + 4 * 500);
}
