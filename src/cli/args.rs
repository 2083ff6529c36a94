use clap::{Args, Parser, Subcommand};

use crate::download::DEFAULT_MODEL;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Compare Options:
    --model, -m <MODEL>      Path to ONNX pose model [default: movenet-multipose-lightning.onnx]
    --image, -i <IMAGE>      Input photograph
    --output, -o <OUTPUT>    Output file stem [default: from preset]
    --arch <ARCH>            Architecture preset (mobilenet, resnet50)
    --pose-conf <CONF>       Pose-level confidence threshold [default: 0.15]
    --part-conf <CONF>       Part-level confidence threshold [default: 0.1]
    --instructor <INDEX>     Instructor pose selector [default: 2]
    --no-instructor          Hide the instructor reference overlay
    --unmirrored             Use the unmirrored preset (no horizontal flip)
    --bbox                   Draw bounding boxes around detected poses
    --show                   Display the result in a window
    --verbose <BOOL>         Show verbose output [default: true]

Examples:
    pose-compare compare --image photo.jpg
    pose-compare compare -m movenet-multipose-lightning.onnx -i photo.jpg --bbox
    pose-compare compare -i photo.jpg --arch resnet50 --no-instructor
    pose-compare compare -i photo.jpg --unmirrored --instructor 0 --verbose false"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render pose overlays on a photograph and compare against the instructor
    Compare(CompareArgs),
}

/// Arguments for the compare command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompareArgs {
    /// Path to ONNX pose model file
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Input photograph
    #[arg(short, long)]
    pub image: String,

    /// Output file stem (extension .png is appended)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Architecture preset (mobilenet, resnet50)
    #[arg(long, default_value = "mobilenet")]
    pub arch: String,

    /// Pose-level confidence threshold
    #[arg(long = "pose-conf", default_value_t = 0.15)]
    pub pose_conf: f32,

    /// Part-level confidence threshold
    #[arg(long = "part-conf", default_value_t = 0.1)]
    pub part_conf: f32,

    /// Instructor pose selector
    #[arg(long, default_value_t = 2)]
    pub instructor: usize,

    /// Hide the instructor reference overlay
    #[arg(long = "no-instructor", default_value_t = false)]
    pub no_instructor: bool,

    /// Use the unmirrored preset (no horizontal flip)
    #[arg(long, default_value_t = false)]
    pub unmirrored: bool,

    /// Draw bounding boxes around detected poses
    #[arg(long, default_value_t = false)]
    pub bbox: bool,

    /// Display the result in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}
