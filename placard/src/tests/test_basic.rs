// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::kurbo::{Point, Size};
use crate::{test_name, BreakReason, Container, Layout};

use super::utils::{line_texts, TestEnv};

fn unbounded(width: f64) -> Container {
    Container::new(Size::new(width, f64::INFINITY))
}

#[test]
fn hello_world() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Hello World");
    let layout = env.layout(&text, &unbounded(400.));

    assert_eq!(layout.len(), 1);
    assert_eq!(layout.row_count(), 1);
    assert_eq!(layout.visible_range(), 0..11);
    assert!(!layout.is_truncated());
    assert_eq!(layout.bounding_size(), Size::new(110., 20.));
    assert_eq!(line_texts(&layout), ["Hello World"]);

    let line = layout.get(0).unwrap();
    assert_eq!(line.break_reason(), BreakReason::None);
    assert_eq!(line.metrics().baseline, 16.);
    assert_eq!(line.baseline_origin(), Point::new(0., 16.));
    let xs: Vec<_> = line.runs().flat_map(|run| run.glyphs()).map(|g| g.x).collect();
    assert_eq!(xs, [0., 10., 20., 30., 40., 50., 60., 70., 80., 90., 100.]);
}

#[test]
fn empty_text_has_one_line() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("");
    let layout = env.layout(&text, &unbounded(400.));

    assert_eq!(layout.len(), 1);
    assert_eq!(layout.visible_range(), 0..0);
    let line = layout.get(0).unwrap();
    assert!(line.is_empty());
    assert_eq!(line.metrics().ascent, 16.);
    assert_eq!(line.metrics().descent, 4.);
    assert_eq!(layout.bounding_size(), Size::new(0., 20.));
}

#[test]
fn newlines_start_new_lines() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("a\n\nb");
    let layout = env.layout(&text, &unbounded(400.));

    let ranges: Vec<_> = layout.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, [0..2, 2..3, 3..4]);
    let reasons: Vec<_> = layout.lines().map(|line| line.break_reason()).collect();
    assert_eq!(
        reasons,
        [BreakReason::Explicit, BreakReason::Explicit, BreakReason::None]
    );
    // The blank line keeps the height of its style.
    assert_eq!(layout.get(1).unwrap().metrics().size(), 20.);
    assert_eq!(layout.bounding_size(), Size::new(10., 60.));
}

#[test]
fn crlf_is_one_break() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("ab\r\ncd");
    let layout = env.layout(&text, &unbounded(400.));
    assert_eq!(line_texts(&layout), ["ab", "cd"]);
    assert_eq!(layout.get(1).unwrap().text_range(), 4..6);
}

#[test]
fn layouts_are_shared_and_deterministic() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Layout>();

    let mut env = TestEnv::new(test_name!());
    let text = env.text("Some words to lay out more than once");
    let container = unbounded(120.);
    let layout = env.layout(&text, &container);
    let shared = layout.clone();
    assert!(layout.ptr_eq(&shared));

    let again = Layout::new(&text, &container);
    assert!(!layout.ptr_eq(&again));
    assert_eq!(line_texts(&layout), line_texts(&again));
    assert_eq!(layout.bounding_size(), again.bounding_size());
}

#[test]
fn default_layout_is_empty_text() {
    let layout = Layout::default();
    assert_eq!(layout.len(), 1);
    assert!(layout.text().is_empty());
    assert!(layout.hit_test(Point::new(0., 0.)).is_none());
}
