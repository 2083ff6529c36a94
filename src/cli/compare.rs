use std::path::Path;
use std::process;

use crate::cli::args::CompareArgs;
use crate::cli::logging;
use crate::detector::{Architecture, DetectorConfig};
use crate::download::ensure_model;
use crate::pipeline::{ComparePipeline, PipelineConfig};
use crate::{error, success, verbose, warn};

/// Run the one-shot comparison pipeline from CLI arguments.
#[allow(clippy::missing_panics_doc)]
pub async fn run_compare(args: &CompareArgs) {
    logging::set_verbose(args.verbose);

    let architecture = match args.arch.as_str() {
        "mobilenet" => Architecture::MobileNetV1,
        "resnet50" | "resnet" => Architecture::ResNet50,
        other => {
            error!("Unknown architecture '{other}', expected mobilenet or resnet50");
            process::exit(1);
        }
    };

    let mut config = if args.unmirrored {
        PipelineConfig::unmirrored()
    } else {
        PipelineConfig::mirrored()
    };
    config.detector = DetectorConfig::new(architecture);
    config.min_pose_confidence = args.pose_conf;
    config.min_part_confidence = args.part_conf;
    config.estimate.score_threshold = args.part_conf;
    config.instructor.index = args.instructor;
    config.show_instructor = !args.no_instructor;
    config.overlay.show_bounding_box = args.bbox;
    if let Some(ref output) = args.output {
        config.output_name.clone_from(output);
    }

    let model_path = match ensure_model(Path::new(&args.model)) {
        Ok(path) => path,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    verbose!(
        "Comparing {} against instructor pose {} ({})",
        args.image,
        config.instructor.index,
        config.detector.model_slug()
    );

    let output_name = config.output_name.clone();
    let frame = match ComparePipeline::run(model_path.as_path(), Path::new(&args.image), config).await
    {
        Ok(frame) => frame,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let output_file = format!("{output_name}.png");
    if let Err(e) = frame.save(&output_file) {
        error!("Failed to save {output_file}: {e}");
        process::exit(1);
    }
    success!("Saved {output_file}");

    #[cfg(feature = "visualize")]
    if args.show {
        show_frame(&frame);
    }

    #[cfg(not(feature = "visualize"))]
    if args.show {
        warn!("--show requires the 'visualize' feature. Compile with --features visualize.");
    }
}

#[cfg(feature = "visualize")]
fn show_frame(frame: &image::RgbaImage) {
    use crate::visualizer::Viewer;

    let mut viewer =
        match Viewer::new("pose-compare", frame.width() as usize, frame.height() as usize) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not open viewer window: {e}");
                return;
            }
        };

    loop {
        match viewer.update(frame) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("Viewer error: {e}");
                break;
            }
        }
    }
}
