use crate::cli::args::FeaturesArgs;
use msgpack_d::bench::{PlatformInfo, available_paths};
use msgpack_d::{CodecConfig, SimdStrategy};

pub fn handle(args: FeaturesArgs, config: &CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let platform = PlatformInfo::detect();
    let paths: Vec<String> = available_paths().iter().map(|p| p.to_string()).collect();
    let selected = SimdStrategy::from_config(config).width();

    if args.json {
        let output = serde_json::json!({
            "arch": platform.arch,
            "features": platform.simd_features,
            "detected_width": platform.width.to_string(),
            "selected_width": selected.to_string(),
            "policy": config.simd.policy.as_str(),
            "paths": paths,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Platform:       {}", platform.display());
    println!(
        "Detected width: {} ({})",
        platform.width,
        platform.width.instruction_set()
    );
    println!(
        "Selected width: {} (policy: {})",
        selected, config.simd.policy
    );
    println!("Codec paths:    {}", paths.join(", "));
    Ok(())
}
