use watermark_engine::{Compositor, LogoUpdate};

use super::{BASE, solid_png, test_workspace};
use crate::preview::PreviewAdapter;
use crate::state::WorkspaceState;

#[test]
fn test_navigation_is_clamped() {
    let mut state = WorkspaceState::default();
    state.add_images((0..3).map(|i| (format!("{i}.png"), solid_png(4, 4, BASE))));

    let mut preview = PreviewAdapter::new();
    preview.request(state.snapshot()).unwrap();
    assert_eq!(preview.position_label(), "1 of 3");
    assert!(!preview.previous());

    assert!(preview.next());
    assert!(preview.next());
    assert!(!preview.next());
    assert_eq!(preview.position(), Some((3, 3)));

    preview.select(99);
    assert_eq!(preview.selected(), 2);
}

#[test]
fn test_selection_clamped_after_removal() {
    let mut state = WorkspaceState::default();
    let report = state.add_images((0..3).map(|i| (format!("{i}.png"), solid_png(4, 4, BASE))));

    let mut preview = PreviewAdapter::new();
    preview.request(state.snapshot());
    preview.select(2);

    state.remove_image(&report.added[2]).unwrap();
    let req = preview.request(state.snapshot()).unwrap();
    assert_eq!(req.index, 1);
    assert_eq!(preview.position_label(), "2 of 2");

    state.remove_image(&report.added[0]).unwrap();
    state.remove_image(&report.added[1]).unwrap();
    assert!(preview.request(state.snapshot()).is_none());
    assert_eq!(preview.position(), None);
    assert!(preview.current().is_none());
}

#[test]
fn test_latest_request_wins() {
    let (mut state, logo) = test_workspace();
    let compositor = Compositor::new();
    let mut preview = PreviewAdapter::new();

    let old = preview.request(state.snapshot()).unwrap();
    state
        .update_logo(
            &logo,
            &LogoUpdate {
                opacity: Some(0.2),
                ..Default::default()
            },
        )
        .unwrap();
    let new = preview.request(state.snapshot()).unwrap();

    let old_frame = PreviewAdapter::render(&compositor, &old).unwrap();
    let new_frame = PreviewAdapter::render(&compositor, &new).unwrap();

    // the newer frame finishes first, the stale one arrives late
    assert!(preview.present(new_frame));
    assert!(!preview.present(old_frame));
    assert_eq!(preview.current().unwrap().generation, new.generation);
}

#[test]
fn test_view_resets_on_selection_change() {
    let (state, _) = test_workspace();
    let compositor = Compositor::new();
    let mut preview = PreviewAdapter::new();
    assert!(preview.refresh(&compositor, state.snapshot()).unwrap());

    preview.view_mut().set_zoom(3.0);
    assert!(preview.view_mut().drag(glam::DVec2::new(5.0, 5.0)));
    assert!(preview.next());
    assert_eq!(preview.view().zoom(), 1.0);
    assert_eq!(preview.view().pan(), glam::DVec2::ZERO);

    assert!(preview.refresh(&compositor, state.snapshot()).unwrap());
    let shown = preview.current().unwrap();
    assert_eq!(shown.image_id, state.images()[1].id);
    assert_eq!(shown.frame.dimensions(), (40, 40));
}
