use anyhow::{bail, Context, Result};
use pdu_utils::{
    deframer::{
        spawn_deframer, BitFormat, Deframer, DeframerConfig, OutputPolicy, RecoveryPolicy,
    },
    pdu::Pdu,
};
use std::{
    fs::File,
    io::{stdout, BufReader, BufWriter, Write},
    path::Path,
};
use tracing::info;

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum Format {
    Json,
    Text,
}

/// Deframer options given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub access_code: Option<String>,
    pub tail_sync: Option<String>,
    pub burst_len: Option<usize>,
    pub threshold: Option<usize>,
    pub output: Option<OutputPolicy>,
    pub recovery: Option<RecoveryPolicy>,
}

/// Merge the options from an optional JSON config file with those from the command line.
pub fn load_config(path: Option<&Path>, opts: Overrides) -> Result<DeframerConfig> {
    let mut config = match (path, opts.burst_len) {
        (Some(path), _) => {
            let file = File::open(path).with_context(|| format!("opening config {path:?}"))?;
            serde_json::from_reader::<_, DeframerConfig>(BufReader::new(file))
                .with_context(|| format!("decoding config {path:?}"))?
        }
        (None, Some(burst_len)) => DeframerConfig::builder()
            .access_code("")
            .burst_len(burst_len)
            .build(),
        (None, None) => bail!("--burst-len is required without --config"),
    };

    if let Some(access_code) = opts.access_code {
        config.access_code = access_code;
    }
    if let Some(tail_sync) = opts.tail_sync {
        config.tail_sync = tail_sync;
    }
    if let Some(burst_len) = opts.burst_len {
        config.burst_len = burst_len;
    }
    if let Some(threshold) = opts.threshold {
        config.threshold = threshold;
    }
    if let Some(output) = opts.output {
        config.output = output;
    }
    if let Some(recovery) = opts.recovery {
        config.recovery = recovery;
    }

    Ok(config)
}

fn bits_string(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}

fn write_text<W: Write>(dst: &mut W, pdu: &Pdu) -> Result<()> {
    let meta: Vec<String> = pdu.meta.iter().map(|(k, v)| format!("{k}={v}")).collect();
    writeln!(dst, "{} {}", meta.join(" "), bits_string(&pdu.data))?;
    Ok(())
}

pub fn deframe(
    srcpath: &Path,
    config: &DeframerConfig,
    input_format: BitFormat,
    format: &Format,
) -> Result<()> {
    let deframer = Deframer::new(config).context("invalid deframer configuration")?;
    let src = BufReader::new(File::open(srcpath).context("opening source")?);
    let mut frames = spawn_deframer(src, deframer, input_format)?;

    let mut dst = BufWriter::new(stdout().lock());
    for zult in frames.by_ref() {
        let pdu = Pdu::from(zult.context("reading bit stream")?);
        match format {
            Format::Json => {
                serde_json::to_writer(&mut dst, &pdu)?;
                writeln!(dst)?;
            }
            Format::Text => write_text(&mut dst, &pdu)?,
        }
    }
    dst.flush()?;

    if let Some(deframer) = frames.finish() {
        let stats = deframer.stats();
        info!(
            bits = stats.bits,
            frames = stats.frames,
            reversed = stats.reversed,
            overlapping = stats.overlapping,
            lock_losses = stats.lock_losses,
            "done"
        );
    }

    Ok(())
}
