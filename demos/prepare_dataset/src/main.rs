use argh::FromArgs;
use std::path::{Path, PathBuf};

use rgbd_prep::image::Image;
use rgbd_prep::pipeline::{
    augment::augment,
    config::PipelineConfig,
    frame::DepthGrid,
    gap_fill::{fill_depth, InpaintingMethod, MM_TO_M},
    hha::{convert_checked, GeocentricHha},
    io::{
        loader::{parse_annotations, parse_depth_text, read_rgb, FileFrameLoader},
        png::{
            read_png_gray16, read_png_gray8, write_png_gray16, write_png_gray8, write_png_rgb16,
            write_png_rgb8,
        },
        sink::{quantize_u16, PngFrameSink, HHA_SCALE, M_TO_MM},
    },
    mask::rasterize_polygons,
    orchestrator::FrameOrchestrator,
};

#[derive(FromArgs)]
/// Prepare RGB-D frames for training
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Run(RunArgs),
    Inpaint(InpaintArgs),
    Annotate(AnnotateArgs),
    Augment(AugmentArgs),
    Hha(HhaArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
/// Process every frame of the raw directory
struct RunArgs {
    /// path to the yaml configuration
    #[argh(option, short = 'c')]
    config: PathBuf,

    /// process frames in parallel
    #[argh(switch)]
    parallel: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "inpaint")]
/// Fill the gaps of one depth map
struct InpaintArgs {
    /// depth in millimeters, as a text grid or a 16-bit png
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// output 16-bit png in millimeters
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// inpainting method
    #[argh(option, default = "String::from(\"linear_nearest\")")]
    method: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "annotate")]
/// Rasterize the polygons of one annotation file
struct AnnotateArgs {
    /// polygon annotation file
    #[argh(option, short = 'a')]
    annotation: PathBuf,

    /// color image giving the mask size
    #[argh(option)]
    rgb: PathBuf,

    /// output 8-bit mask png
    #[argh(option, short = 'o')]
    output: PathBuf,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "augment")]
/// Augment one rgb, depth and mask triple
struct AugmentArgs {
    /// color image
    #[argh(option)]
    rgb: PathBuf,

    /// depth png in millimeters, 16-bit
    #[argh(option)]
    depth: PathBuf,

    /// mask png, 8-bit
    #[argh(option)]
    mask: PathBuf,

    /// path to the yaml configuration
    #[argh(option, short = 'c')]
    config: PathBuf,

    /// directory receiving the augmented triple
    #[argh(option, short = 'o')]
    output_dir: PathBuf,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "hha")]
/// Encode one depth map as HHA
struct HhaArgs {
    /// depth png in millimeters, 16-bit
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the yaml configuration
    #[argh(option, short = 'c')]
    config: PathBuf,

    /// output 16-bit rgb png, HHA scaled by 1000
    #[argh(option, short = 'o')]
    output: PathBuf,
}

fn read_depth_m(path: &Path) -> Result<DepthGrid, Box<dyn std::error::Error>> {
    Ok(read_png_gray16(path)?.cast_and_scale::<f32>(MM_TO_M)?)
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from_file(&args.config)?;

    let loader = FileFrameLoader::new(&config.paths.raw_dir);
    let sink = PngFrameSink::create_run(&config.paths.processed_dir)?;

    let orchestrator = FrameOrchestrator::new(
        &config,
        Box::new(loader),
        Box::new(sink),
        Box::new(GeocentricHha),
    )?
    .with_parallel(config.execution.parallel || args.parallel);

    let report = orchestrator.run()?;
    println!(
        "{} frames processed, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );

    Ok(())
}

fn inpaint(args: InpaintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let method = args.method.parse::<InpaintingMethod>()?;

    let depth_mm = if args.input.extension().is_some_and(|ext| ext == "png") {
        read_png_gray16(&args.input)?.cast::<f32>()?
    } else {
        parse_depth_text(&std::fs::read_to_string(&args.input)?, &args.input)?
    };

    let filled = fill_depth(&depth_mm, method)?;
    write_png_gray16(&args.output, &quantize_u16(&filled, M_TO_MM))?;

    log::info!("Wrote {}", args.output.display());

    Ok(())
}

fn annotate(args: AnnotateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rgb = read_rgb(&args.rgb)?;
    let polygons = parse_annotations(
        &std::fs::read_to_string(&args.annotation)?,
        &args.annotation,
    )?;

    let mask = rasterize_polygons(&polygons, rgb.size())?;
    write_png_gray8(&args.output, &mask)?;

    log::info!("Wrote {} polygons to {}", polygons.len(), args.output.display());

    Ok(())
}

fn augment_triple(args: AugmentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from_file(&args.config)?;

    let rgb = read_rgb(&args.rgb)?;
    let depth = read_depth_m(&args.depth)?;
    let mask = read_png_gray8(&args.mask)?;

    let out = augment(&rgb, &depth, &mask, &config.augmentation)?;

    std::fs::create_dir_all(&args.output_dir)?;
    write_png_rgb8(args.output_dir.join("rgb.png"), &out.rgb)?;
    write_png_gray16(
        args.output_dir.join("depth.png"),
        &quantize_u16(&out.depth, M_TO_MM),
    )?;
    write_png_gray8(args.output_dir.join("mask.png"), &out.mask)?;

    log::info!("Wrote augmented triple to {}", args.output_dir.display());

    Ok(())
}

fn hha(args: HhaArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from_file(&args.config)?;
    let depth = read_depth_m(&args.input)?;

    let intrinsics = config.cameras.depth_camera_matrix.to_matrix();
    let hha: Image<f32, 3> = convert_checked(&GeocentricHha, &depth, &intrinsics)?;
    write_png_rgb16(&args.output, &quantize_u16(&hha, HHA_SCALE))?;

    log::info!("Wrote {}", args.output.display());

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    match args.command {
        Command::Run(args) => run(args),
        Command::Inpaint(args) => inpaint(args),
        Command::Annotate(args) => annotate(args),
        Command::Augment(args) => augment_triple(args),
        Command::Hha(args) => hha(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbd_prep::pipeline::error::ConfigError;

    #[test]
    fn parse_augment_command() -> Result<(), argh::EarlyExit> {
        let args = Args::from_args(
            &["rgbd-prep"],
            &[
                "augment", "--rgb", "a.jpg", "--depth", "a.png", "--mask", "m.png", "-c",
                "config.yaml", "-o", "out",
            ],
        )?;

        let Command::Augment(augment) = args.command else {
            panic!("expected the augment command");
        };
        assert_eq!(augment.depth, PathBuf::from("a.png"));
        assert_eq!(augment.output_dir, PathBuf::from("out"));

        Ok(())
    }

    #[test]
    fn augment_help_lists_inputs() {
        let res = Args::from_args(&["rgbd-prep"], &["augment", "--help"]);
        let Err(early_exit) = res else {
            panic!("--help must exit early");
        };
        assert!(early_exit.output.contains("depth png in millimeters, 16-bit"));
        assert!(early_exit.output.contains("mask png, 8-bit"));
    }

    #[test]
    fn missing_config_is_reported() {
        let res = hha(HhaArgs {
            input: PathBuf::from("depth.png"),
            config: PathBuf::from("/definitely/not/here/config.yaml"),
            output: PathBuf::from("hha.png"),
        });

        let err = res.err().map(|e| e.downcast::<ConfigError>());
        assert!(matches!(err, Some(Ok(e)) if matches!(*e, ConfigError::NotFound(_))));
    }
}
