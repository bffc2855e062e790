//! Both backends must agree on canvas size and placement topology.
//!
//! Pixels may differ by resampling filter; which capture occupies which slot
//! may not. Without the `accelerated` feature only the portable backend runs.

use image::{DynamicImage, Rgb as Pixel, RgbImage, Rgba, RgbaImage};
use printbooth::imaging::{
    BackendKind, FactoryOptions, Orientation, Rect, accelerated_available, build_factory,
};

fn capture(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Pixel(color)))
}

const COLORS: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];

fn render(
    kind: BackendKind,
    captures: &[DynamicImage],
    orientation: Orientation,
    crop: bool,
) -> (RgbaImage, Vec<Rect>) {
    let options = FactoryOptions {
        orientation,
        dpi: 60,
        force_portable: kind == BackendKind::Portable,
        backend: Some(kind),
        ..FactoryOptions::default()
    };
    let mut factory = build_factory(captures, &options).unwrap();
    assert_eq!(factory.backend_kind(), kind);
    factory.set_margin(12);
    factory.set_cropping(crop);
    let layout = factory.layout();
    (factory.build().unwrap().clone(), layout.captures)
}

fn kinds() -> Vec<BackendKind> {
    if accelerated_available() {
        vec![BackendKind::Portable, BackendKind::Accelerated]
    } else {
        vec![BackendKind::Portable]
    }
}

fn slot_colors(image: &RgbaImage, slots: &[Rect]) -> Vec<Rgba<u8>> {
    slots
        .iter()
        .map(|slot| {
            let (x, y) = slot.center();
            *image.get_pixel(x, y)
        })
        .collect()
}

#[test]
fn same_topology_for_every_count_and_orientation() {
    for count in 1..=4 {
        let captures: Vec<_> = COLORS[..count]
            .iter()
            .map(|c| capture(320, 240, *c))
            .collect();
        for orientation in [Orientation::Auto, Orientation::Portrait, Orientation::Landscape] {
            for crop in [false, true] {
                let results: Vec<_> = kinds()
                    .into_iter()
                    .map(|kind| render(kind, &captures, orientation, crop))
                    .collect();

                let (reference, reference_slots) = &results[0];
                let expected: Vec<_> = COLORS[..count]
                    .iter()
                    .map(|[r, g, b]| Rgba([*r, *g, *b, 255]))
                    .collect();
                assert_eq!(slot_colors(reference, reference_slots), expected);

                for (image, slots) in &results[1..] {
                    assert_eq!(image.dimensions(), reference.dimensions());
                    assert_eq!(slots, reference_slots);
                    assert_eq!(slot_colors(image, slots), expected);
                }
            }
        }
    }
}

#[test]
fn accelerated_request_matches_availability() {
    let captures = vec![capture(320, 240, [0, 0, 0])];
    let options = FactoryOptions {
        backend: Some(BackendKind::Accelerated),
        dpi: 60,
        ..FactoryOptions::default()
    };
    let result = build_factory(&captures, &options);
    if cfg!(feature = "accelerated") {
        assert_eq!(result.unwrap().backend_kind(), BackendKind::Accelerated);
    } else {
        assert!(result.is_err());
    }
}
