use std::fs;
use std::path::Path;
use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    application: Application,
    decoder: Decoder,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Decoder {
    stream_format: String,
    sample_rate: u32,
    channels: u32,
    max_pending_frames: usize,
}

// 在编译时读取 config.toml 并设置环境变量
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    // 应用信息
    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    // 解码器默认配置
    println!("cargo:rustc-env=DECODER_STREAM_FORMAT={}", config.decoder.stream_format);
    println!("cargo:rustc-env=DECODER_SAMPLE_RATE={}", config.decoder.sample_rate);
    println!("cargo:rustc-env=DECODER_CHANNELS={}", config.decoder.channels);
    println!("cargo:rustc-env=DECODER_MAX_PENDING_FRAMES={}", config.decoder.max_pending_frames);
}
