//! Demo binary that builds a synthetic sky and runs it through the whole
//! pipeline: resolution changes, arithmetic, projection and vector fields.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p skymap-demo -- --nside 128 --projection sin`.

mod render;
mod sky;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skymap_config::{CliArgs, Config, ConfigError};
use skymap_map::{MapScalar, NullPolicy, SkyMap};
use skymap_pixel::{Nside, PixelOrder, SkyError, distance, neighbors};
use skymap_proj::Projection;
use tracing::{error, info};

use crate::render::INK;
use crate::sky::SkySampler;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sky(#[from] SkyError),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Degrade to a quarter of the resolution and back, and count the cells the
/// round trip changed.
fn demonstrate_resolution(sky: &SkyMap<f64>) -> Result<(), DemoError> {
    let coarse_nside = Nside::new((sky.nside().get() / 4).max(1))?;
    let coarse = sky.degrade(coarse_nside)?;
    let restored = coarse.upgrade(sky.nside())?;
    let changed = (0..sky.npix())
        .filter(|&pix| {
            matches!(
                (sky.get(pix), restored.get(pix)),
                (Ok(a), Ok(b)) if (a - b).abs() > 1e-12
            )
        })
        .count();
    info!(
        from = sky.nside().get(),
        to = coarse_nside.get(),
        changed,
        "Resolution round trip"
    );
    Ok(())
}

/// Mask the sky to its bright half and combine it with itself.
fn demonstrate_arithmetic(sky: &SkyMap<f64>) -> Result<SkyMap<f64>, DemoError> {
    let mut bright = sky.clone();
    for (pix, value) in sky.iter_populated() {
        if value <= 0.0 {
            bright.set(pix, f64::NULL)?;
        }
    }
    let mut doubled = bright.clone();
    doubled.add(&bright, NullPolicy::Intersection)?;
    let mut filled = bright.clone();
    filled.subtract(sky, NullPolicy::Union)?;

    // A renumbered operand is reordered back before combining.
    let mut nested = sky.clone();
    nested.to_order(PixelOrder::Nested)?;
    let mut ratio = sky.clone();
    ratio.divide(&nested, NullPolicy::Intersection)?;
    let unity = ratio.iter_populated().filter(|(_, v)| (v - 1.0).abs() < 1e-12).count();
    info!(
        bright = bright.populated(),
        doubled = doubled.populated(),
        union = filled.populated(),
        unity,
        "Arithmetic"
    );

    let counts = bright.convert::<i32>()?;
    info!("Integer copy:\n{}", counts.info());
    Ok(bright)
}

fn demonstrate_neighbours(rng: &mut ChaCha8Rng, sky: &SkyMap<f64>) -> Result<Vec<u64>, DemoError> {
    let (nside, order) = (sky.nside(), sky.order());
    let centre = rng.random_range(0..sky.npix());
    let mut cells = neighbors(nside, order, centre)?;
    let spacing = cells
        .iter()
        .map(|&n| distance(nside, order, centre, n))
        .collect::<Result<Vec<_>, _>>()?;
    let mean = spacing.iter().sum::<f64>() / spacing.len() as f64;
    info!(
        centre,
        neighbours = cells.len(),
        mean_spacing_deg = mean.to_degrees(),
        "Neighbour lookup"
    );
    cells.push(centre);
    Ok(cells)
}

fn run(args: &CliArgs) -> Result<(), DemoError> {
    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => skymap_config::config_dir()?,
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(args);

    let log_dir = config_dir.join("logs");
    skymap_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    config.validate()?;

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(seed, "Generating sky");

    let map_cfg = &config.map;
    let sampler = SkySampler::new(rng.random());
    let mut sky = sampler.fill(map_cfg.nside()?, map_cfg.order, map_cfg.frame, map_cfg.storage)?;
    sky.set_name("synthetic sky");
    sky.set_units("arb");
    info!("Sky map:\n{}", sky.info());

    demonstrate_resolution(&sky)?;
    let bright = demonstrate_arithmetic(&sky)?;
    let patch = demonstrate_neighbours(&mut rng, &sky)?;

    let proj_cfg = &config.projection;
    let mut proj = Projection::new(
        proj_cfg.width,
        proj_cfg.height,
        proj_cfg.kind,
        proj_cfg.window()?,
    )?;
    proj.project_map(&sky)?;
    info!("Projection:\n{}", proj.info());
    let mut img = render::grayscale(&proj);

    // Longitude component from the bright mask, colatitude from the sky.
    let mut phi_comp = sky.clone();
    phi_comp.set_all(0.0)?;
    phi_comp.add(&bright, NullPolicy::Union)?;
    let field = proj.project_vector_field(
        &sky,
        &phi_comp,
        config.vector_field.sample_nside()?,
        config.vector_field.max_magnitude,
    )?;
    render::draw_arrows(&mut img, &field, INK);

    let mut u = sky.clone();
    u.scale(-0.5)?;
    u.offset(0.1)?;
    let polarization = proj.project_polarization(
        &sky,
        &u,
        config.vector_field.sample_nside()?,
        config.vector_field.max_magnitude,
    )?;
    info!(
        vectors = field.len(),
        polarization = polarization.len(),
        "Vector fields"
    );

    let points: Vec<(f64, f64)> = (0..32)
        .map(|_| {
            (
                rng.random_range(0.0..=std::f64::consts::PI),
                rng.random_range(0.0..std::f64::consts::TAU),
            )
        })
        .collect();
    let marked = proj.project_points(&points)?;
    render::plot_cells(&mut img, &marked, INK);
    let outlined = proj.project_pixels(sky.nside(), sky.order(), &patch)?;
    render::plot_cells(&mut img, &outlined, INK);
    info!(points = marked.len(), patch = outlined.len(), "Overlays");

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("skymap.png"));
    img.save(&output)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("skymap: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skymap_map::StorageMode;
    use skymap_pixel::CoordFrame;

    fn sky(order: PixelOrder) -> SkyMap<f64> {
        SkySampler::new(11)
            .fill(Nside::new(8).unwrap(), order, CoordFrame::Galactic, StorageMode::Dense)
            .unwrap()
    }

    #[test]
    fn test_bright_mask_keeps_positive_cells() {
        let sky = sky(PixelOrder::Ring);
        let bright = demonstrate_arithmetic(&sky).unwrap();
        assert!(bright.populated() > 0);
        assert!(bright.populated() < sky.populated());
        for (pix, v) in bright.iter_populated() {
            assert!(v > 0.0);
            assert_eq!(v, sky.get(pix).unwrap());
        }
    }

    #[test]
    fn test_neighbour_patch_includes_centre() {
        let sky = sky(PixelOrder::Nested);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let patch = demonstrate_neighbours(&mut rng, &sky).unwrap();
        assert!((8..=9).contains(&patch.len()));
        let centre = *patch.last().unwrap();
        assert!(patch[..patch.len() - 1].iter().all(|&p| p != centre));
    }

    #[test]
    fn test_resolution_round_trip_runs() {
        demonstrate_resolution(&sky(PixelOrder::Ring)).unwrap();
    }
}
