use rayon::prelude::*;

use crate::codegen::bytecode::Program;
use crate::codegen::lower::lower;
use crate::codegen::vm::eval_with_stack;
use crate::foundation::core::{ImageIndex, Rgba};
use crate::foundation::error::{TexError, TexResult};
use crate::formula::token::Expr;

/// Row-major, tightly packed linear RGBA image.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl LinearImage {
    /// `width * height` pixels of `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> TexResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TexError::validation(format!(
                "image {width}x{height} needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Worker settings for [`combine`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombineSettings {
    /// Override the number of rayon worker threads. `None` uses the global pool.
    pub threads: Option<usize>,
}

/// Evaluate a color/alpha formula pair over every pixel of `inputs`.
///
/// Output rgb comes from `color`, alpha from the alpha channel of `alpha`. All inputs
/// must share one size, and every image the formulas reference must be present. Rows are
/// evaluated in parallel.
#[tracing::instrument(level = "debug", skip_all, fields(inputs = inputs.len()), err)]
pub fn combine(
    color: &Expr,
    alpha: &Expr,
    inputs: &[LinearImage],
    settings: &CombineSettings,
) -> TexResult<LinearImage> {
    let (width, height) = validate_inputs(inputs)?;
    let color = compile_program(color, inputs.len())?;
    let alpha = compile_program(alpha, inputs.len())?;

    let mut out = LinearImage::new(width, height, Rgba::TRANSPARENT);
    if out.pixels.is_empty() {
        return Ok(out);
    }

    let row_len = width as usize;
    let run = |pixels: &mut [Rgba]| -> TexResult<()> {
        pixels.par_chunks_mut(row_len).enumerate().try_for_each_init(
            || Vec::with_capacity(color.max_stack.max(alpha.max_stack)),
            |stack, (y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    let idx = y * row_len + x;
                    let sample = |i: ImageIndex| {
                        inputs
                            .get(i.0 as usize)
                            .and_then(|img| img.pixels.get(idx).copied())
                    };
                    let c = eval_with_stack(&color, stack, sample)
                        .map_err(|e| TexError::evaluation(format!("color at ({x}, {y}): {e}")))?;
                    let a = eval_with_stack(&alpha, stack, sample)
                        .map_err(|e| TexError::evaluation(format!("alpha at ({x}, {y}): {e}")))?;
                    *px = Rgba::new(c.r, c.g, c.b, a.a);
                }
                Ok(())
            },
        )
    };

    match settings.threads {
        Some(n) => build_thread_pool(n)?.install(|| run(&mut out.pixels))?,
        None => run(&mut out.pixels)?,
    }

    tracing::debug!(width, height, "combined");
    Ok(out)
}

fn validate_inputs(inputs: &[LinearImage]) -> TexResult<(u32, u32)> {
    let Some(first) = inputs.first() else {
        return Err(TexError::validation("combine needs at least one input image"));
    };
    for (i, img) in inputs.iter().enumerate() {
        if (img.width, img.height) != (first.width, first.height) {
            return Err(TexError::validation(format!(
                "image I{i} is {}x{}, expected {}x{}",
                img.width, img.height, first.width, first.height
            )));
        }
        if img.pixels.len() != img.width as usize * img.height as usize {
            return Err(TexError::validation(format!(
                "image I{i} has {} pixels for {}x{}",
                img.pixels.len(),
                img.width,
                img.height
            )));
        }
    }
    Ok((first.width, first.height))
}

fn compile_program(expr: &Expr, num_images: usize) -> TexResult<Program> {
    if let Some(i) = expr.max_image()
        && !i.is_within(num_images)
    {
        return Err(TexError::validation(format!(
            "formula references {i} but only {num_images} image(s) were given"
        )));
    }
    lower(expr).map_err(|e| TexError::evaluation(e.to_string()))
}

fn build_thread_pool(threads: usize) -> TexResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(TexError::validation("combine 'threads' must be >= 1 when set"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| TexError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/combine.rs"]
mod tests;
