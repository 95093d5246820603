//! End-to-end: script source through the parser and the engine, with real
//! PNG files on disk.

use std::path::{Path, PathBuf};

use fliper_core::FliperError;
use fliper_lang::parse_program;
use fliper_render::{render_program, EngineOptions, FrameCause, RenderResult};

/// A scratch directory holding a red and a blue 4x4 PNG.
fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fliper_scripts_{}_{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
        .save(dir.join("red.png"))
        .unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
        .save(dir.join("blue.png"))
        .unwrap();
    dir
}

fn render(dir: &Path, source: &str) -> Result<RenderResult, FliperError> {
    let program = parse_program(source)?;
    let options = EngineOptions {
        base_dir: Some(dir.to_path_buf()),
        ..EngineOptions::default()
    };
    render_program(&program, options)
}

#[test]
fn test_block_frame_count_is_longest_duration() {
    let dir = fixture_dir("longest");
    let source = r#"
canvas 32 32
image "red.png" "x"
image "blue.png" "y"
begin
  move "x" 5 0 3
  rotate "y" 90 5
end
"#;
    let result = render(&dir, source).unwrap();
    assert_eq!(result.frame_count(), 2 + 5);
    let block_ticks = result
        .timeline
        .iter()
        .filter(|r| matches!(r.cause, FrameCause::Block { .. }))
        .count();
    assert_eq!(block_ticks, 5);
}

#[test]
fn test_parallel_moves_reach_targets() {
    let dir = fixture_dir("parallel");
    let source = r#"
canvas 16 16 0 0 0 255
image "red.png" "x"
image "blue.png" "y"
begin
move "x" 5 0 2
move "y" 0 5 4
end
"#;
    let result = render(&dir, source).unwrap();
    assert_eq!(result.frame_count(), 6);

    let positions: Vec<_> = result.timeline[2..]
        .iter()
        .map(|r| ((r.objects[0].x, r.objects[0].y), (r.objects[1].x, r.objects[1].y)))
        .collect();
    assert_eq!(
        positions,
        vec![
            ((3, 0), (0, 2)),
            ((5, 0), (0, 3)),
            ((5, 0), (0, 4)),
            ((5, 0), (0, 5)),
        ]
    );

    let last = result.frames.last().unwrap();
    assert_eq!(last.get_pixel(5, 0), Some([255, 0, 0, 255]));
    assert_eq!(last.get_pixel(0, 5), Some([0, 0, 255, 255]));
    assert_eq!(last.get_pixel(15, 15), Some([0, 0, 0, 255]));
}

#[test]
fn test_full_program_frame_accounting() {
    let dir = fixture_dir("accounting");
    let source = r#"
// one of everything
canvas 24 24
image "red.png" "r" 2 2
move "r" 10 10 4
rotate "r" 45 3
opacity "r" 128 2
scale "r" 2 2 2
wait 3
delete "r"
"#;
    let result = render(&dir, source).unwrap();
    assert_eq!(result.frame_count(), 1 + 4 + 3 + 2 + 2 + 3 + 1);
    assert_eq!(result.fps, 15.0);
    assert!(result.timeline.last().unwrap().objects.is_empty());
    assert_eq!(result.timeline[1].line, 5);
}

#[test]
fn test_errors_carry_script_positions() {
    let dir = fixture_dir("errors");
    let cases = [
        ("wait 2", "At 1:6, Canvas size not set before drawing."),
        ("image \"red.png\" \"a\"", "At 1:7, Canvas size not set before drawing."),
        ("move \"a\" 1 1 1", "At 1:6, Canvas size not set before drawing."),
        ("begin\nend", "At 1:1, Canvas size not set before drawing."),
        ("canvas 4 4\ncanvas 8 8", "At 2:8, Canvas size changed after drawing commands."),
        (
            "canvas 4 4\nimage \"red.png\" \"a\"\nimage \"blue.png\" \"a\"",
            "At 3:18, ID a is already associated with an image.",
        ),
        ("canvas 4 4\nmove \"ghost\" 1 1 1", "At 2:6, No image is associated with ID ghost"),
        ("canvas 4 4\ndelete \"ghost\"", "At 2:8, No image is associated with ID ghost"),
        (
            "canvas 4 4\nimage \"red.png\" \"a\"\ndelete \"a\"\ndelete \"a\"",
            "At 4:8, No image is associated with ID a",
        ),
        (
            "canvas 4 4\nimage \"red.png\" \"a\"\nscale \"a\" 1000000000000 1 1",
            "At 3:1, an image of 4000000000000x4 pixels exceeds the limit of 67108864 pixels",
        ),
        (
            "canvas 100000 100000",
            "At 1:8, an image of 100000x100000 pixels exceeds the limit of 67108864 pixels",
        ),
        (
            "canvas 4 4\nimage \"red.png\" \"a\"\nwait 0",
            "At 3:6, Duration must be strictly greater than 0",
        ),
        ("canvas 4 4 0 0 0 256", "At 1:18, 0 <= alpha value <= 255 (got 256)"),
        ("canvas 4 4\nimage \"nope.png\" \"a\"", ""),
    ];

    for (source, expected) in cases {
        let err = render(&dir, source).unwrap_err();
        if expected.is_empty() {
            assert!(err.to_string().starts_with("At 2:7, Image at "), "{}", err);
            assert!(err.to_string().ends_with("nope.png does not exist."), "{}", err);
        } else {
            assert_eq!(err.to_string(), expected, "source: {:?}", source);
        }
    }
}

#[test]
fn test_directory_and_garbage_images_are_rejected() {
    let dir = fixture_dir("badimages");
    std::fs::create_dir_all(dir.join("sub")).unwrap();
    std::fs::write(dir.join("junk.png"), b"not an image").unwrap();

    let err = render(&dir, "canvas 4 4\nimage \"sub\" \"a\"").unwrap_err();
    assert!(err.to_string().ends_with("sub is not a file"), "{}", err);

    let err = render(&dir, "canvas 4 4\nimage \"junk.png\" \"a\"").unwrap_err();
    assert!(err.to_string().ends_with("junk.png cannot be opened or identified."), "{}", err);
}

#[test]
fn test_block_errors() {
    let dir = fixture_dir("blocks");
    let nested = render(&dir, "canvas 4 4\nbegin\nbegin\nend\nend").unwrap_err();
    assert!(matches!(nested, FliperError::NestedBlock { .. }));

    let stray = render(&dir, "canvas 4 4\nend").unwrap_err();
    assert!(matches!(stray, FliperError::BlockEndWithoutBegin { .. }));

    let open = render(&dir, "canvas 4 4\nimage \"red.png\" \"a\"\nbegin\nmove \"a\" 1 1 2").unwrap_err();
    assert_eq!(open.to_string(), "At 3:1, block is never closed before the end of the program");

    let deleted = render(
        &dir,
        "canvas 4 4\nimage \"red.png\" \"a\"\nbegin\nmove \"a\" 1 1 2\ndelete \"a\"\nend",
    )
    .unwrap_err();
    assert_eq!(deleted.to_string(), "At 4:6, No image is associated with ID a");
}

#[test]
fn test_rendering_is_deterministic() {
    let dir = fixture_dir("determinism");
    let source = r#"
canvas 20 20 10 20 30 255
image "red.png" "a" 3 3
image "blue.png" "b" 8 8
begin
rotate "a" 30 4
opacity "b" 60 3
scale "b" 1.5 0.5 2
end
"#;
    let first = render(&dir, source).unwrap();
    let second = render(&dir, source).unwrap();
    assert_eq!(first.content_hash(), second.content_hash());
    assert_eq!(first.frames, second.frames);
}
