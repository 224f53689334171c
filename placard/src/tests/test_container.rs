// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::kurbo::{Circle, Insets, Point, Rect, Shape, Size};
use crate::{test_name, BreakReason, Alignment, Container, FixedLineHeight, VerticalAlignment};

use super::utils::{line_texts, TestEnv};

#[test]
fn insets_shrink_the_region() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Most words are short");
    let container = Container::new(Size::new(116., f64::INFINITY))
        .insets(Insets::new(5., 7., 11., 13.));
    let layout = env.layout(&text, &container);

    assert_eq!(line_texts(&layout), ["Most words", "are short"]);
    assert_eq!(layout.get(0).unwrap().baseline_origin(), Point::new(5., 23.));
    assert_eq!(layout.bounding_size(), Size::new(116., 60.));
}

#[test]
fn exclusion_splits_rows() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("aaaa bbbb cccc dddd eeee ffff gggg");
    let hole = Rect::new(80., 0., 120., 35.).to_path(0.1);
    let container = Container::new(Size::new(200., f64::INFINITY)).exclude(hole);
    let layout = env.layout(&text, &container);

    assert_eq!(
        line_texts(&layout),
        ["aaaa", "bbbb", "cccc", "dddd", "eeee ffff gggg"]
    );
    assert_eq!(layout.row_count(), 3);
    let rows: Vec<_> = layout.lines().map(|line| line.row()).collect();
    assert_eq!(rows, [0, 0, 1, 1, 2]);
    assert_eq!(layout.get(1).unwrap().rect().x0, 120.);
    assert_eq!(layout.bounding_size(), Size::new(160., 60.));
}

#[test]
fn boundary_path_offsets_text() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Most words are short");
    let path = Rect::new(20., 10., 120., 100.).to_path(0.1);
    let layout = env.layout(&text, &Container::with_path(path));

    assert_eq!(line_texts(&layout), ["Most words", "are short"]);
    assert_eq!(layout.get(0).unwrap().baseline_origin(), Point::new(20., 26.));
    assert_eq!(layout.bounding_size(), Size::new(120., 50.));
}

#[test]
fn circle_keeps_lines_inside() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text(
        "Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod \
         tempor incididunt ut labore et dolore magna aliqua ut enim ad minim veniam",
    );
    let circle = Circle::new((100., 100.), 100.).to_path(0.01);
    let layout = env.layout(&text, &Container::with_path(circle));

    assert!(!layout.is_empty());
    // Nothing fits the very top of the circle.
    assert!(layout.get(0).unwrap().metrics().min_coord > 0.);
    for line in layout.lines() {
        let metrics = line.metrics();
        let middle = (metrics.min_coord + metrics.max_coord) * 0.5;
        let half = (100f64.powi(2) - (middle - 100.).powi(2)).sqrt();
        let end = metrics.offset + metrics.advance - metrics.trailing_whitespace;
        assert!(metrics.offset >= 100. - half - 0.5, "{metrics:?}");
        assert!(end <= 100. + half + 0.5, "{metrics:?}");
        assert!(metrics.max_coord <= 200.);
    }
}

#[test]
fn word_wider_than_every_chord_is_broken() {
    let mut env = TestEnv::new(test_name!());
    // The first word is exactly as wide as the circle, so no chord fits it.
    let text = env.text("aaaaaaaaaa bb cc dd");
    let circle = Circle::new((50., 50.), 50.).to_path(0.01);
    let layout = env.layout(&text, &Container::with_path(circle));

    assert_eq!(layout.visible_range().start, 0);
    let lines = line_texts(&layout);
    assert_eq!(lines[..2], ["aaaaaaaaa", "a bb cc"]);
    // The word goes where the circle is widest.
    let first = layout.get(0).unwrap().metrics();
    assert_eq!(first.min_coord, 40.);
    assert_eq!(layout.get(0).unwrap().break_reason(), BreakReason::Emergency);
    assert!(layout.is_truncated());
}

#[test]
fn vertical_alignment() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Most words are short");
    let layout = |env: &mut TestEnv, alignment| {
        let container = Container::new(Size::new(100., 100.)).vertical_alignment(alignment);
        env.layout(&text, &container)
    };
    let baselines = |layout: &crate::Layout| -> Vec<f64> {
        layout.lines().map(|line| line.metrics().baseline).collect()
    };

    let top = layout(&mut env, VerticalAlignment::Top);
    assert_eq!(baselines(&top), [16., 36.]);
    assert_eq!(top.bounding_size(), Size::new(100., 40.));

    let center = layout(&mut env, VerticalAlignment::Center);
    assert_eq!(baselines(&center), [46., 66.]);
    assert_eq!(center.bounding_size(), Size::new(100., 70.));
    let hit = center.hit_test(Point::new(5., 35.)).unwrap();
    assert_eq!((hit.line, hit.offset), (0, 0));

    let bottom = layout(&mut env, VerticalAlignment::Bottom);
    assert_eq!(baselines(&bottom), [76., 96.]);
    assert_eq!(bottom.bounding_size(), Size::new(100., 100.));

    // Unbounded height leaves nothing to distribute.
    let container = Container::new(Size::new(100., f64::INFINITY))
        .vertical_alignment(VerticalAlignment::Bottom);
    assert_eq!(baselines(&env.layout(&text, &container)), [16., 36.]);
}

#[test]
fn vertical_alignment_of_columns() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("abcde");
    let column = |env: &mut TestEnv, alignment| {
        let container = Container::new(Size::new(100., 100.))
            .vertical(true)
            .vertical_alignment(alignment);
        let layout = env.layout(&text, &container);
        (layout.get(0).unwrap().rect(), layout.bounding_size())
    };

    assert_eq!(
        column(&mut env, VerticalAlignment::Top),
        (Rect::new(80., 0., 100., 50.), Size::new(100., 50.))
    );
    assert_eq!(
        column(&mut env, VerticalAlignment::Center),
        (Rect::new(80., 25., 100., 75.), Size::new(100., 75.))
    );
    assert_eq!(
        column(&mut env, VerticalAlignment::Bottom),
        (Rect::new(80., 50., 100., 100.), Size::new(100., 100.))
    );
}

#[test]
fn shaped_containers_ignore_vertical_alignment() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Most words are short");
    let circle = Circle::new((100., 100.), 100.).to_path(0.01);
    let top = env.layout(&text, &Container::with_path(circle.clone()));
    let centered = env.layout(
        &text,
        &Container::with_path(circle).vertical_alignment(VerticalAlignment::Center),
    );
    assert_eq!(
        top.get(0).unwrap().metrics().baseline,
        centered.get(0).unwrap().metrics().baseline
    );
}

#[test]
fn zero_extent_has_no_lines() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("abc");
    let layout = env.layout(&text, &Container::new(Size::new(0., 100.)));

    assert!(layout.is_empty());
    assert!(layout.is_truncated());
    assert_eq!(layout.visible_range(), 0..0);
    assert_eq!(layout.bounding_size(), Size::ZERO);
    assert!(layout.hit_test(Point::new(0., 0.)).is_none());

    let squeezed = Container::new(Size::new(10., 10.)).insets(Insets::uniform(6.));
    let layout = env.layout(&text, &squeezed);
    assert!(layout.is_empty());
    assert_eq!(layout.bounding_size(), Size::new(10., 10.));
}

#[test]
fn line_position_modifier() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("Most words are short");
    let container = Container::new(Size::new(100., f64::INFINITY))
        .line_position_modifier(FixedLineHeight { height: 30. });
    let layout = env.layout(&text, &container);

    let baselines: Vec<_> = layout.lines().map(|line| line.metrics().baseline).collect();
    assert_eq!(baselines, [21., 51.]);
    assert_eq!(layout.bounding_size(), Size::new(100., 60.));
}

#[test]
fn alignment() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("ab");
    let offset = |env: &mut TestEnv, alignment| {
        let container = Container::new(Size::new(100., f64::INFINITY)).alignment(alignment);
        env.layout(&text, &container).get(0).unwrap().metrics().offset
    };
    assert_eq!(offset(&mut env, Alignment::Start), 0.);
    assert_eq!(offset(&mut env, Alignment::Left), 0.);
    assert_eq!(offset(&mut env, Alignment::Center), 40.);
    assert_eq!(offset(&mut env, Alignment::Right), 80.);
    assert_eq!(offset(&mut env, Alignment::End), 80.);
}

#[test]
fn justified() {
    let mut env = TestEnv::new(test_name!());
    let text = env.text("aa bb cc dd ee");
    let container =
        Container::new(Size::new(100., f64::INFINITY)).alignment(Alignment::Justified);
    let layout = env.layout(&text, &container);

    let xs: Vec<_> = layout
        .get(0)
        .unwrap()
        .runs()
        .flat_map(|run| run.glyphs())
        .map(|glyph| glyph.x)
        .collect();
    assert_eq!(xs, [0., 10., 20., 40., 50., 60., 80., 90., 100.]);
    // The last line keeps its natural spacing.
    let last = layout.get(1).unwrap();
    assert_eq!(last.metrics().offset, 0.);
    assert_eq!(last.metrics().advance, 50.);
}
