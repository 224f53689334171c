// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::kurbo::{Point, Size};
use crate::{test_name, Container, HitKind};

use super::utils::{line_texts, TestEnv};

fn container(width: f64) -> Container {
    Container::new(Size::new(width, f64::INFINITY))
}

#[test]
fn rtl_paragraph_is_right_aligned_and_reversed() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("\u{5D0}\u{5D1}\u{5D2} \u{5D3}\u{5D4}");
    let layout = env.layout(&text, &container(200.));

    assert!(layout.is_rtl());
    let line = layout.get(0).unwrap();
    assert!(line.is_rtl());
    assert_eq!(line.metrics().offset, 140.);
    assert_eq!(line_texts(&layout), ["\u{5D4}\u{5D3} \u{5D2}\u{5D1}\u{5D0}"]);
    assert_eq!(layout.bounding_size(), Size::new(200., 20.));
}

#[test]
fn mixed_directions_split_runs() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("abc \u{5D0}\u{5D1} def");
    let layout = env.layout(&text, &container(400.));

    assert!(!layout.is_rtl());
    assert_eq!(line_texts(&layout), ["abc \u{5D1}\u{5D0} def"]);
    let levels: Vec<_> = layout
        .get(0)
        .unwrap()
        .runs()
        .map(|run| run.bidi_level())
        .collect();
    assert_eq!(levels, [0, 1, 0]);
}

#[test]
fn rtl_whitespace_hangs_on_the_left() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("\u{5D0}\u{5D1} \u{5D2}\u{5D3}");
    let layout = env.layout(&text, &container(30.));

    assert_eq!(layout.len(), 2);
    let first = layout.get(0).unwrap();
    assert_eq!(first.metrics().offset, 0.);
    let glyphs: Vec<_> = first
        .runs()
        .flat_map(|run| run.glyphs())
        .map(|glyph| (char::from_u32(glyph.id).unwrap(), glyph.x))
        .collect();
    assert_eq!(glyphs, [(' ', 0.), ('\u{5D1}', 10.), ('\u{5D0}', 20.)]);
    assert_eq!(layout.get(1).unwrap().metrics().offset, 10.);
}

#[test]
fn rtl_hits() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("\u{5D0}\u{5D1}\u{5D2}");
    let layout = env.layout(&text, &container(200.));

    let hit = layout.hit_test(Point::new(199., 10.)).unwrap();
    assert_eq!((hit.kind, hit.offset), (HitKind::Exact, 0));
    // Left of the text is its logical end.
    let hit = layout.hit_test(Point::new(100., 10.)).unwrap();
    assert_eq!((hit.kind, hit.offset), (HitKind::Nearest, 6));
}
