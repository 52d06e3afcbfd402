use super::*;

#[test]
fn hidden_in_quiet_mode() {
    let progress = RunProgress::new(true);
    progress.progress(0.5);
    progress.finish();
}

#[test]
fn fraction_maps_onto_bar() {
    let progress = RunProgress::new_with_visibility(true, false);
    progress.progress(0.25);
    assert_eq!(progress.position(), 250);
    progress.progress(1.0);
    assert_eq!(progress.position(), BAR_LENGTH);
}

#[test]
fn out_of_range_fractions_are_clamped() {
    let progress = RunProgress::new_with_visibility(true, false);
    progress.progress(3.0);
    assert_eq!(progress.position(), BAR_LENGTH);
    progress.progress(-1.0);
    assert_eq!(progress.position(), 0);
}

#[test]
fn caption_is_kept_until_cleared() {
    let progress = RunProgress::new_with_visibility(true, false);
    progress.status("[ERR] ./main not found");
    assert_eq!(progress.caption(), "[ERR] ./main not found");
    progress.status("");
    assert_eq!(progress.caption(), "");
}

#[test]
fn bar_restarts_after_run_finishes() {
    let progress = RunProgress::new_with_visibility(true, false);
    progress.progress(1.0);
    progress.status("");
    progress.progress(0.5);
    assert_eq!(progress.position(), 500);
}

#[test]
fn visible_bar_accepts_updates() {
    let progress = RunProgress::new_with_visibility(false, true);
    progress.progress(0.5);
    progress.finish();
}
