//! External tool diagnostics.

use crate::ffmpeg;

use super::print_ffmpeg_install_instructions;

/// Check that ffmpeg is installed and report its capabilities
pub fn cmd_check_tools() -> anyhow::Result<()> {
    println!("Checking external tools...\n");

    if let Some(version) = ffmpeg::version() {
        println!("✓ ffmpeg: {}", version);
        if ffmpeg::supports_hw_accel() {
            println!("✓ NVENC hardware encoding: available");
        } else {
            println!("✗ NVENC hardware encoding: not available");
        }
    } else {
        println!("✗ ffmpeg: NOT FOUND");
        print_ffmpeg_install_instructions();
    }

    Ok(())
}
