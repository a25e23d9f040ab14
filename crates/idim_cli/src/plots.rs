//! All image rendering for the noise experiment. The core never touches
//! file paths; every function here takes its output path from the caller.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use idim_core::{EigenvalueMatrix, PointCloud};

use crate::experiment::SigmaSpectrum;

const LINE_BLUE: RGBColor = RGBColor(67, 99, 216);
const RED_LINE: RGBColor = RGBColor(230, 25, 75);
const BAND_GREEN: RGBColor = RGBColor(60, 180, 75);

/// 3-D scatter of a point cloud, colored by the z-coordinate so the shape
/// reads clearly.
pub fn plot_sphere_3d(cloud: &PointCloud, title: &str, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let matrix = cloud.as_matrix();
    let lim = matrix.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())) * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(-lim..lim, -lim..lim, -lim..lim)?;
    chart.with_projection(|mut projection| {
        projection.pitch = 0.3;
        projection.yaw = 0.6;
        projection.scale = 0.8;
        projection.into_matrix()
    });
    chart.configure_axes().draw()?;

    chart.draw_series(matrix.row_iter().map(|row| {
        let (x, y, z) = (row[0], row[1], row[2]);
        let t = ((z + lim) / (2.0 * lim)).clamp(0.0, 1.0);
        // Cool blue for low z, warm red for high z.
        let color = HSLColor(0.7 * (1.0 - t), 0.8, 0.45);
        Circle::new((x, y, z), 2, color.mix(0.7).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Every eigenvalue component as a function of point index, one color band
/// per component. On a clean sphere the smallest band hugs zero.
pub fn plot_eigenvalues_per_point(
    eigenvalues: &EigenvalueMatrix,
    title: &str,
    path: &Path,
) -> Result<()> {
    let n = eigenvalues.n_points();
    let dim = eigenvalues.dim();
    let matrix = eigenvalues.as_matrix();
    let y_max = matrix.iter().fold(0.0_f64, |acc, v| acc.max(*v)) * 1.05;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let root = BitMapBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..n, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Point index")
        .y_desc("Eigenvalue magnitude")
        .draw()?;

    let colors = [LINE_BLUE, RED_LINE, BAND_GREEN];
    // Draw from last to first so the largest component lands on top.
    for j in (0..dim).rev() {
        let color = colors[j % colors.len()];
        chart
            .draw_series((0..n).map(|i| Circle::new((i, matrix[(i, j)]), 1, color.mix(0.5).filled())))?
            .label(format!("e{j} (eigenvalue {j})"))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Grouped bars of the mean eigenvalue spectrum per noise level with
/// +/- 1 std error bars, color-ramped from cool (clean) to warm (noisy).
pub fn plot_eigenvalue_spectra_by_noise(spectra: &[SigmaSpectrum], path: &Path) -> Result<()> {
    let Some(first) = spectra.first() else {
        anyhow::bail!("no spectra to plot");
    };
    let n_components = first.mean_eigenvalues.len();

    let y_max = spectra
        .iter()
        .flat_map(|s| {
            s.mean_eigenvalues
                .iter()
                .zip(&s.std_eigenvalues)
                .map(|(m, sd)| m + sd)
        })
        .fold(0.0_f64, f64::max)
        * 1.15;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let sigma_min = spectra.iter().map(|s| s.sigma).fold(f64::INFINITY, f64::min);
    let sigma_max = spectra
        .iter()
        .map(|s| s.sigma)
        .fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Eigenvalue Spectra Across Noise Levels", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n_components as f64 - 0.5), 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_labels(n_components)
        .x_label_formatter(&|x| format!("e{}", x.round() as i64))
        .x_desc("Eigenvalue component (e0 = largest)")
        .y_desc("Mean eigenvalue magnitude")
        .draw()?;

    let bar_width = 0.8 / spectra.len() as f64;
    for (i, spectrum) in spectra.iter().enumerate() {
        let offset = (i as f64 - spectra.len() as f64 / 2.0) * bar_width + bar_width / 2.0;
        let t = if sigma_max > sigma_min {
            (spectrum.sigma - sigma_min) / (sigma_max - sigma_min)
        } else {
            0.0
        };
        let color = HSLColor(0.6 * (1.0 - t), 0.75, 0.5);

        chart
            .draw_series((0..n_components).map(|j| {
                let center = j as f64 + offset;
                let mean = spectrum.mean_eigenvalues[j];
                Rectangle::new(
                    [(center - bar_width / 2.0, 0.0), (center + bar_width / 2.0, mean)],
                    color.filled(),
                )
            }))?
            .label(format!("σ = {}", spectrum.sigma))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
            });

        chart.draw_series((0..n_components).map(|j| {
            let center = j as f64 + offset;
            let mean = spectrum.mean_eigenvalues[j];
            let std = spectrum.std_eigenvalues[j];
            ErrorBar::new_vertical(
                center,
                (mean - std).max(0.0),
                mean,
                mean + std,
                BLACK.filled(),
                6,
            )
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Estimated intrinsic dimension as a function of noise, with a dashed line
/// marking the true dimension.
pub fn plot_id_vs_noise(
    sigmas: &[f64],
    id_estimates: &[usize],
    true_id: usize,
    path: &Path,
) -> Result<()> {
    let x_max = sigmas.iter().fold(0.0_f64, |acc, s| acc.max(*s)).max(0.1) * 1.05;
    let y_max = id_estimates
        .iter()
        .map(|&id| id + 1)
        .max()
        .unwrap_or(0)
        .max(4) as f64;

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Intrinsic Dimension Estimate vs Noise Level",
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Noise standard deviation (σ)")
        .y_desc("Estimated intrinsic dimension")
        .draw()?;

    let points: Vec<(f64, f64)> = sigmas
        .iter()
        .zip(id_estimates)
        .map(|(&s, &id)| (s, id as f64))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), LINE_BLUE.stroke_width(2)))?
        .label("Spectral Gap Estimate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_BLUE.stroke_width(2)));
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 5, LINE_BLUE.filled())),
    )?;

    chart
        .draw_series(DashedLineSeries::new(
            [(0.0, true_id as f64), (x_max, true_id as f64)],
            6,
            4,
            RED_LINE.stroke_width(1),
        ))?
        .label(format!("True ID = {true_id}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED_LINE.stroke_width(1)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}
