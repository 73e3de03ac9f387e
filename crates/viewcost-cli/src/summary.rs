use console::Style;
use viewcost_core::io::sequence::ClipSource;
use viewcost_core::pipeline::config::PreprocessConfig;
use viewcost_core::pipeline::{ClipReport, StageReport};
use viewcost_core::viewport::FieldOfView;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ok: Style,
    failed: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            failed: Style::new().red().bold(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &PreprocessConfig, clips: &[ClipSource]) {
    let s = Styles::new();
    let fov: &FieldOfView = &config.viewport.fov;
    let (half_w, half_h) = fov.half_extents(config.resolution);

    println!();
    println!("  {}", s.title.apply_to("viewcost"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(8)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Clips"),
        s.value.apply_to(clips.len())
    );
    for clip in clips {
        println!("    {}", s.path.apply_to(clip.root.display()));
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Resolution"),
        s.value.apply_to(config.resolution)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(config.threshold)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Stages"),
        s.value.apply_to(&config.stages)
    );
    if let Some(threads) = config.threads {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Threads"),
            s.value.apply_to(threads)
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Viewport"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("FOV"),
        s.value.apply_to(format!(
            "{:.3}° x {:.3}°",
            fov.horizontal_deg, fov.vertical_deg
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Pixels"),
        s.value.apply_to(format!("{} x {}", 2 * half_w, 2 * half_h))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Center y"),
        s.value.apply_to(config.center_y())
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sweep"),
        s.value.apply_to(format!("{} centers", config.viewport.center_steps))
    );
    println!();
}

fn print_stage(s: &Styles, name: &str, stage: Option<&StageReport>) {
    let Some(stage) = stage else {
        println!(
            "    {:<12}{}",
            s.label.apply_to(name),
            s.disabled.apply_to("skipped")
        );
        return;
    };

    let status = if stage.is_success() {
        s.ok.apply_to("ok".to_string())
    } else {
        s.failed
            .apply_to(format!("{} failed", stage.failures.len()))
    };
    println!(
        "    {:<12}{} computed, {} cached  {}",
        s.label.apply_to(name),
        s.value.apply_to(stage.computed),
        s.value.apply_to(stage.cached),
        status
    );
    for failure in &stage.failures {
        println!(
            "      {} {}",
            s.failed.apply_to(&failure.unit),
            failure.message
        );
    }
}

pub fn print_clip_report(report: &ClipReport) {
    let s = Styles::new();

    println!(
        "  {} {}",
        s.header.apply_to(&report.clip),
        s.label.apply_to(format!("({} frames)", report.frame_count))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cache"),
        s.path.apply_to(report.cache_dir.display())
    );
    if report.removed > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Removed"),
            s.value.apply_to(report.removed)
        );
    }
    print_stage(&s, "Tables", report.tables.as_ref());
    print_stage(&s, "Matrices", report.matrices.as_ref());
    println!();
}
