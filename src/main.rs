use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gbdecompress::{
    Decompressor, Rom, RomMap, SimulatedLcd, TileSet, VideoPort, Vram, GRAYSCALE,
};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
struct Arguments {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompress a single GB-compressed stream into a file
    Decompress {
        input: PathBuf,

        #[command(flatten)]
        args: DecompressArgs,
    },

    /// Load every asset of a ROM map into emulated VRAM and export the result
    Load {
        rom: PathBuf,

        /// ROM map listing the compressed assets
        #[arg(short = 'm', long)]
        map: PathBuf,

        #[command(flatten)]
        args: LoadArgs,
    },

    /// Scan a ROM for potential compressed tile sets. This will return a lot of garbage but can
    /// still be useful for finding assets that are not in a ROM map
    Scan {
        rom: PathBuf,

        #[command(flatten)]
        args: ScanArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    colog::init();

    match args.command {
        Commands::Decompress { input, args } => decompress(input, args),
        Commands::Load { rom, map, args } => load(rom, map, args),
        Commands::Scan { rom, args } => scan(rom, args),
    }
}

#[derive(Args, Debug, Clone)]
struct DecompressArgs {
    /// Where the decompressed data is written to
    #[arg(short, long)]
    output: PathBuf,

    /// Offset of the compressed stream inside the input file
    #[arg(long, default_value = "0", value_parser = parse_offset)]
    offset: usize,
}

fn parse_offset(value: &str) -> Result<usize, std::num::ParseIntError> {
    match value.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse(),
    }
}

fn decompress(input: PathBuf, args: DecompressArgs) -> anyhow::Result<()> {
    let src = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let result = Decompressor::new(&src, args.offset)
        .decompress()
        .with_context(|| format!("Failed to decompress {}", input.display()))?;

    fs::write(&args.output, &result.data).with_context(|| "Failed to write output file")?;

    log::info!(
        "Decompressed {} -> {} bytes into {}",
        result.bytes_read,
        result.data.len(),
        args.output.display()
    );

    Ok(())
}

#[derive(Args, Debug, Clone)]
struct LoadArgs {
    /// The output directory to export the VRAM tile sheet and buffer assets to
    #[arg(short, long, default_value = "export")]
    out_dir: PathBuf,

    /// Overwrite the output directory if it already exists
    #[arg(long)]
    force: bool,

    /// Dots the emulated LCD advances per mode query
    #[arg(long, default_value = "4")]
    dots_per_query: u32,
}

fn load(rom_path: PathBuf, map_path: PathBuf, args: LoadArgs) -> anyhow::Result<()> {
    let rom = Rom::open(&rom_path)?;
    let map = RomMap::parse(&fs::read_to_string(&map_path)?)
        .with_context(|| format!("Failed to parse ROM map {}", map_path.display()))?;

    if map.is_compatible_with(&rom) {
        log::info!(
            "Loaded ROM: '{}' with CRC: {:#010x}",
            map.name.as_deref().unwrap_or("unnamed"),
            rom.crc()
        );
    } else {
        log::warn!("ROM map is not compatible with the supplied ROM. Continuing anyway.");
    }

    if args.force && args.out_dir.exists() {
        fs::remove_dir_all(&args.out_dir)
            .with_context(|| "Failed to clean up old export directory")?;
    }
    fs::create_dir(&args.out_dir).with_context(|| "Failed to create output directory")?;

    let mut port = VideoPort::new(
        SimulatedLcd::new(args.dots_per_query),
        Vram::new(),
        map.bg_addressing,
    );

    let assets = rom.load_assets(&map, &mut port)?;

    for asset in &assets {
        if let Some(data) = &asset.data {
            let path = args.out_dir.join(format!("{}.bin", asset.name));
            fs::write(&path, data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Exported buffer asset: {}", path.display());
        }
    }

    let sheet = TileSet::from_slice(port.memory.tile_data())
        .to_sheet(16, &map.palette.palette())
        .with_context(|| "Failed to render VRAM tile sheet")?;
    let path = args.out_dir.join("vram.png");
    sheet.save(&path).with_context(|| "Failed to save VRAM tile sheet")?;

    log::info!(
        "Done! Loaded {} assets in {:.2} frames, VRAM exported to {}",
        assets.len(),
        port.oracle.frames(),
        path.display()
    );

    Ok(())
}

#[derive(Args, Debug, Clone)]
struct ScanArgs {
    /// The output directory to export found tile sets to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Overwrite the output directory if it already exists
    #[arg(short, long)]
    force: bool,

    /// The minimum number of tiles to consider a valid tile set
    #[arg(short, long, default_value = "16")]
    threshold: usize,
}

fn scan(rom_path: PathBuf, args: ScanArgs) -> anyhow::Result<()> {
    use indicatif::ProgressBar;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    log::info!("Scanning entire ROM for compressed tile sets...");

    let rom = Rom::open(&rom_path)?;

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| format!("scan_{:08x}", rom.crc()).into());

    if args.force && out_dir.exists() {
        fs::remove_dir_all(&out_dir).with_context(|| "Failed to clean up old scan directory")?;
    }
    fs::create_dir(&out_dir).with_context(|| "Failed to create output directory")?;

    let progress = ProgressBar::new(rom.data().len() as u64);

    let found = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    (0..rom.data().len()).into_par_iter().for_each(|offset| {
        progress.inc(1);

        let Ok(result) = Decompressor::new(rom.data(), offset).decompress() else {
            return;
        };

        let Some(tiles) = TileSet::try_from_slice(&result.data) else {
            return;
        };

        if tiles.len() < args.threshold || tiles.len() > 384 {
            return;
        }

        let end_position = offset + result.bytes_read;
        progress.println(format!(
            "Found potential tile set with {} tiles at {:#07x}-{:#07x}",
            tiles.len(),
            offset,
            end_position
        ));

        let path = out_dir.join(format!("tiles_{:#07x}-{:#07x}.png", offset, end_position));
        if let Err(err) = tiles
            .to_sheet(16, &GRAYSCALE)
            .and_then(|sheet| sheet.save(&path))
        {
            progress.println(format!("Failed to save {}: {}", path.display(), err));
            failed.fetch_add(1, Ordering::SeqCst);
            return;
        }

        found.fetch_add(1, Ordering::SeqCst);
    });

    progress.finish_and_clear();
    log::info!(
        "Done! Found {} potential tile sets",
        found.load(Ordering::SeqCst)
    );

    let failed = failed.load(Ordering::SeqCst);
    if failed > 0 {
        anyhow::bail!("Failed to export {} tile sets", failed);
    }

    Ok(())
}
