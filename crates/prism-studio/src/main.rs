use anyhow::{Context, Result};

use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::{
    DataFormat, DeviceBufferRepr, DiskRepr, Engine, EngineConfig, Extent, Layer, RamRepr,
    TextureRepr, Volume,
};

fn main() -> Result<()> {
    // Startup banner, printed before the device is opened.
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          PRISM DATA STUDIO v0.1        ║");
    println!("  ║   ram · disk · texture · device buffer ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    init_logging(LoggingConfig {
        trace_conversions: std::env::args().any(|a| a == "--trace"),
        ..LoggingConfig::default()
    });

    let host_only = std::env::args().any(|a| a == "--host-only");
    let config = if host_only {
        EngineConfig::host_only()
    } else {
        EngineConfig::default()
    };
    let engine = Engine::new(config).context("engine start-up failed")?;

    println!("  Registered paths:");
    for line in engine.registry().describe() {
        println!("    {line}");
    }
    println!();

    // ── DISK ──────────────────────────────────────────────────────────────
    disk_volume(&engine)?;

    // ── DEVICE ────────────────────────────────────────────────────────────
    if engine.gpu().is_none() {
        println!("  [GPU] no device, skipping texture and buffer walkthrough");
        return Ok(());
    }
    upload_and_edit(&engine)?;
    missing_backend(&engine);
    resize(&engine)?;

    Ok(())
}

fn ramp_layer(engine: &Engine) -> Result<Layer> {
    let extent = Extent::d2(4, 4);
    let values: Vec<f32> = (0..16).map(|v| v as f32).collect();
    Ok(engine.layer(RamRepr::from_vec(extent, 1, values)?)?)
}

fn disk_volume(engine: &Engine) -> Result<()> {
    let extent = Extent::d3(4, 4, 4);
    let values: Vec<u16> = (0..64).map(|v| v * 1000).collect();
    let path = std::env::temp_dir().join(format!("prism-studio-{}.raw", std::process::id()));
    std::fs::write(&path, bytemuck::cast_slice::<u16, u8>(&values))
        .with_context(|| format!("writing {}", path.display()))?;

    let mut volume: Volume = engine.volume(DiskRepr::new(&path, extent, DataFormat::U16))?;
    let corner = volume.representation::<RamRepr>()?.element::<u16>(3, 3, 3).map(|c| c[0]);
    println!("  [DISK] loaded {extent} u16 volume, corner = {corner:?}");
    println!("         {volume}");

    std::fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
    println!();
    Ok(())
}

fn upload_and_edit(engine: &Engine) -> Result<()> {
    let mut layer = ramp_layer(engine)?;

    let tex = layer.representation::<TextureRepr>()?;
    let bytes = tex.read_bytes()?;
    println!("  [UPLOAD] texture read back {} bytes", bytes.len());

    let mut edited: Vec<f32> = (0..16).map(|v| v as f32).collect();
    edited[5] = 99.0;
    layer
        .editable_representation::<TextureRepr>()?
        .write_bytes(bytemuck::cast_slice(&edited))?;

    let before = layer.stats().conversions();
    let value = layer.representation::<RamRepr>()?.element::<f32>(1, 1, 0).map(|c| c[0]);
    println!(
        "  [EDIT] ram sees {value:?} after {} conversion(s)",
        layer.stats().conversions() - before
    );

    layer.representation::<DeviceBufferRepr>()?;
    println!("         {layer}");
    println!();
    Ok(())
}

fn missing_backend(engine: &Engine) {
    let extent = Extent::d2(2, 2);
    let rgb = match RamRepr::from_vec(extent, 3, vec![0.0f64; 12]) {
        Ok(rgb) => rgb,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    let result = engine
        .layer(rgb)
        .and_then(|mut layer| layer.representation::<TextureRepr>().map(|_| ()));
    match result {
        Ok(()) => println!("  [MISMATCH] unexpectedly converted f64x3 to a texture"),
        Err(err) => println!("  [MISMATCH] {err}"),
    }
    println!();
}

fn resize(engine: &Engine) -> Result<()> {
    let mut layer = ramp_layer(engine)?;
    layer.representation::<TextureRepr>()?;
    layer.representation::<DeviceBufferRepr>()?;
    println!("  [RESIZE] before: {layer}");

    layer.resize::<RamRepr>(Extent::d2(8, 8))?;
    println!("           after:  {layer}");

    let before = layer.stats();
    layer.representation::<TextureRepr>()?;
    let after = layer.stats();
    println!(
        "           texture request: {} created, {} updated",
        after.created - before.created,
        after.updated - before.updated
    );
    println!();
    Ok(())
}
