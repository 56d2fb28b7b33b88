use super::*;
use crate::formula::compile;

fn gradient(width: u32, height: u32) -> LinearImage {
    let mut pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            pixels.push(Rgba::new(x as f32, y as f32, 0.0, 1.0));
        }
    }
    LinearImage::from_pixels(width, height, pixels).unwrap()
}

#[test]
fn color_and_alpha_are_taken_from_separate_formulas() {
    let a = gradient(3, 2);
    let b = LinearImage::new(3, 2, Rgba::new(0.0, 0.0, 1.0, 0.25));
    let color = compile("I0 + I1", 2).unwrap();
    let alpha = compile("I1", 2).unwrap();

    let out = combine(&color, &alpha, &[a, b], &CombineSettings::default()).unwrap();
    assert_eq!((out.width, out.height), (3, 2));
    assert_eq!(out.get(2, 1), Some(Rgba::new(2.0, 1.0, 1.0, 0.25)));
    assert_eq!(out.get(0, 0), Some(Rgba::new(0.0, 0.0, 1.0, 0.25)));
    assert_eq!(out.get(3, 0), None);
}

#[test]
fn dedicated_pool_matches_global_pool() {
    let img = gradient(17, 9);
    let color = compile("sin(I0) * 0.5 + 0.5", 1).unwrap();
    let alpha = compile("1", 1).unwrap();
    let inputs = [img];

    let global = combine(&color, &alpha, &inputs, &CombineSettings::default()).unwrap();
    let pooled = combine(
        &color,
        &alpha,
        &inputs,
        &CombineSettings { threads: Some(2) },
    )
    .unwrap();
    assert_eq!(global, pooled);
}

#[test]
fn mismatched_sizes_are_rejected() {
    let color = compile("I0", 2).unwrap();
    let err = combine(
        &color,
        &color,
        &[gradient(2, 2), gradient(3, 2)],
        &CombineSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TexError::Validation(_)));
}

#[test]
fn missing_inputs_are_rejected() {
    let color = compile("I1", 2).unwrap();
    let err = combine(&color, &color, &[gradient(1, 1)], &CombineSettings::default()).unwrap_err();
    assert!(err.to_string().contains("I1"));

    assert!(combine(&color, &color, &[], &CombineSettings::default()).is_err());
}

#[test]
fn zero_threads_is_invalid() {
    let color = compile("I0", 1).unwrap();
    let err = combine(
        &color,
        &color,
        &[gradient(1, 1)],
        &CombineSettings { threads: Some(0) },
    )
    .unwrap_err();
    assert!(matches!(err, TexError::Validation(_)));
}

#[test]
fn from_pixels_checks_length() {
    assert!(LinearImage::from_pixels(2, 2, vec![Rgba::TRANSPARENT; 3]).is_err());
}
