use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use blitline::{
    ArgbU16, ColorEncoding, ColorParams, ColorRange, FormatDesc, FrameInfo, LineBuffer,
    PixelFormat, PlaneLayout, Rect, Rotation, SourceJob, Transform, WritebackJob, compose_row,
    writeback_row,
};

#[derive(Parser, Debug)]
#[command(name = "blitline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack a PNG image into a raw pixel-format dump (tightly packed planes).
    Pack(PackArgs),
    /// Unpack a raw pixel-format dump into a PNG image.
    Unpack(UnpackArgs),
    /// List the supported pixel formats.
    Formats(FormatsArgs),
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Input PNG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Destination pixel format (fourcc, e.g. XR24 or NV12).
    #[arg(long)]
    format: PixelFormat,

    /// Output raw dump path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct UnpackArgs {
    /// Input raw dump.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Buffer width in pixels.
    #[arg(long)]
    width: u32,

    /// Buffer height in pixels.
    #[arg(long)]
    height: u32,

    /// Source pixel format (fourcc, e.g. XR24 or NV12).
    #[arg(long)]
    format: PixelFormat,

    /// YCbCr encoding standard for YUV sources.
    #[arg(long, value_enum, default_value_t = EncodingChoice::Bt601)]
    encoding: EncodingChoice,

    /// YCbCr sample range for YUV sources.
    #[arg(long, value_enum, default_value_t = RangeChoice::Limited)]
    range: RangeChoice,

    /// Rotation applied while sampling.
    #[arg(long, value_enum, default_value_t = RotationChoice::Deg0)]
    rotation: RotationChoice,

    /// Mirror horizontally.
    #[arg(long)]
    reflect_x: bool,

    /// Mirror vertically.
    #[arg(long)]
    reflect_y: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FormatsArgs {
    /// Emit the table as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EncodingChoice {
    Bt601,
    Bt709,
    Bt2020,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RangeChoice {
    Limited,
    Full,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RotationChoice {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Pack(args) => cmd_pack(args),
        Command::Unpack(args) => cmd_unpack(args),
        Command::Formats(args) => cmd_formats(args),
    }
}

/// Sequential plane offsets with no padding between rows or planes.
fn tight_layout(format: PixelFormat, width: u32, height: u32) -> (Vec<PlaneLayout>, usize) {
    let mut planes = Vec::with_capacity(format.plane_count());
    let mut offset = 0usize;
    for plane in 0..format.plane_count() {
        let pitch =
            (width as usize).div_ceil(format.plane_hsub(plane) as usize) * format.cpp(plane);
        let rows = (height as usize).div_ceil(format.plane_vsub(plane) as usize);
        planes.push(PlaneLayout { offset, pitch });
        offset += pitch * rows;
    }
    (planes, offset)
}

fn full_frame(format: PixelFormat, width: u32, height: u32) -> anyhow::Result<FrameInfo> {
    let (planes, _) = tight_layout(format, width, height);
    Ok(FrameInfo::new(
        format,
        &planes,
        width,
        height,
        Rect::new(0, 0, (width as i32) << 16, (height as i32) << 16),
        Rect::new(0, 0, width as i32, height as i32),
        Transform::default(),
    )?)
}

fn cmd_pack(args: PackArgs) -> anyhow::Result<()> {
    let img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();

    let (_, data_len) = tight_layout(args.format, width, height);
    let mut data = vec![0u8; data_len];
    let info = full_frame(args.format, width, height)?;
    let mut job = WritebackJob::new(info, &mut data)?;

    let mut staging = LineBuffer::new(width as usize);
    for y in 0..height {
        for x in 0..width {
            let p = img.get_pixel(x, y);
            staging.pixels_mut()[x as usize] = ArgbU16::from_rgba8(p[0], p[1], p[2], p[3]);
        }
        writeback_row(&mut job, &staging, y as i32);
    }

    fs::write(&args.out, &data)
        .with_context(|| format!("write raw dump '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} bytes, {})", args.out.display(), data_len, args.format);
    Ok(())
}

fn cmd_unpack(args: UnpackArgs) -> anyhow::Result<()> {
    let data = fs::read(&args.in_path)
        .with_context(|| format!("read raw dump '{}'", args.in_path.display()))?;

    let transform = Transform {
        rotation: match args.rotation {
            RotationChoice::Deg0 => Rotation::Deg0,
            RotationChoice::Deg90 => Rotation::Deg90,
            RotationChoice::Deg180 => Rotation::Deg180,
            RotationChoice::Deg270 => Rotation::Deg270,
        },
        reflect_x: args.reflect_x,
        reflect_y: args.reflect_y,
    };
    let (out_w, out_h) = match transform.rotation {
        Rotation::Deg90 | Rotation::Deg270 => (args.height, args.width),
        _ => (args.width, args.height),
    };

    let (planes, _) = tight_layout(args.format, args.width, args.height);
    let info = FrameInfo::new(
        args.format,
        &planes,
        args.width,
        args.height,
        Rect::new(0, 0, (args.width as i32) << 16, (args.height as i32) << 16),
        Rect::new(0, 0, out_w as i32, out_h as i32),
        transform,
    )?;
    let params = ColorParams {
        encoding: match args.encoding {
            EncodingChoice::Bt601 => ColorEncoding::Bt601,
            EncodingChoice::Bt709 => ColorEncoding::Bt709,
            EncodingChoice::Bt2020 => ColorEncoding::Bt2020,
        },
        range: match args.range {
            RangeChoice::Limited => ColorRange::Limited,
            RangeChoice::Full => ColorRange::Full,
        },
    };
    let job = SourceJob::new(info, &data, params)?;

    let mut staging = LineBuffer::new(out_w as usize);
    let mut rgba = vec![0u8; out_w as usize * out_h as usize * 4];
    for y in 0..out_h {
        compose_row(&mut staging, &job, y as i32);
        // the row order (not the per-row pixel order) of a vertical mirror
        // is resolved by the row scheduler, which here is this loop
        let out_y = if transform.reflect_y { out_h - 1 - y } else { y };
        let row_start = out_y as usize * out_w as usize * 4;
        for (x, px) in staging.pixels().iter().enumerate() {
            rgba[row_start + x * 4..row_start + x * 4 + 4].copy_from_slice(&px.to_rgba8());
        }
    }

    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        out_w,
        out_h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_formats(args: FormatsArgs) -> anyhow::Result<()> {
    let descs: Vec<FormatDesc> = PixelFormat::ALL.into_iter().map(FormatDesc::of).collect();
    if args.json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &descs)
            .with_context(|| "serialize format table")?;
        println!();
        return Ok(());
    }

    println!("fourcc  planes  cpp        sub   alpha  decode  encode");
    for d in descs {
        println!(
            "{:<7} {:<7} {:<10} {}x{}   {:<6} {:<7} {}",
            d.fourcc,
            d.planes,
            format!("{:?}", d.cpp),
            d.hsub,
            d.vsub,
            d.alpha,
            d.decode,
            d.encode,
        );
    }
    Ok(())
}
