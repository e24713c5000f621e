use anyhow::{Result, anyhow};
use colored::*;
use kokoro_client::response::{JobInfo, PhonemeResult};
use kokoro_client::{
    Artifact, CaptionRequest, CombineRequest, KokoroClient, KokoroError, KokoroResponse,
    NormalizedResult, Operation, PhonemizeRequest, SpeechRequest, to_srt,
};
use spinners::{Spinner, Spinners};

use crate::cli_args::Commands;
use crate::utils::{print_saved, print_separator, write_artifact};

/// Runs one request subcommand against the configured endpoint
pub async fn run(client: &KokoroClient, command: Commands) -> Result<()> {
    match command {
        Commands::Speak {
            text,
            voice,
            speed,
            format,
            model,
            output,
        } => {
            let mut req = SpeechRequest::new().text(text);
            if let Some(v) = voice {
                req = req.voice(v);
            }
            if let Some(s) = speed {
                req = req.speed(s);
            }
            if let Some(f) = format {
                req = req.format(f);
            }
            if let Some(m) = model {
                req = req.model(m);
            }
            speak(client, req, output.as_deref()).await
        }
        Commands::Voices => voices(client).await,
        Commands::Combine { voices, output } => combine(client, voices, output.as_deref()).await,
        Commands::Caption {
            text,
            voice,
            audio_output,
            srt_output,
        } => {
            let mut req = CaptionRequest::new().text(text);
            if let Some(v) = voice {
                req = req.voice(v);
            }
            caption(client, req, audio_output.as_deref(), srt_output.as_deref()).await
        }
        Commands::Phonemize { text, language } => {
            let mut req = PhonemizeRequest::new().text(text);
            if let Some(l) = language {
                req = req.language(l);
            }
            phonemize(client, req).await
        }
        // handled before a client is built
        Commands::Completion { .. } => unreachable!(),
    }
}

async fn speak(client: &KokoroClient, req: SpeechRequest, output: Option<&str>) -> Result<()> {
    let cfg = client.config();
    let format = req.format.unwrap_or(cfg.response_format);
    println!("{} {}", "Text:".bold(), req.text);
    println!(
        "{} {}",
        "Voice:".bold(),
        req.voice.as_deref().unwrap_or(&cfg.voice)
    );

    let resp = send(client, &req.into(), "Generating audio...").await?;
    match resp.result.into_success().map_err(describe)? {
        NormalizedResult::Audio(audio) => {
            let artifact = Artifact::audio(audio.bytes, format);
            let path = write_artifact(&artifact, output)?;
            print_saved("Audio", &path, &artifact);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn voices(client: &KokoroClient) -> Result<()> {
    let resp = send(client, &Operation::ListVoices, "Fetching voices...").await?;
    match resp.result.into_success().map_err(describe)? {
        NormalizedResult::VoiceList(voices) => {
            println!("{} {} voices", "✓".bright_green(), voices.len());
            for voice in voices {
                println!("  - {}", voice);
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn combine(client: &KokoroClient, voices: String, output: Option<&str>) -> Result<()> {
    let op: Operation = CombineRequest::new(voices).into();
    let resp = send(client, &op, "Combining voices...").await?;
    match resp.result.into_success().map_err(describe)? {
        NormalizedResult::VoiceBlend(bytes) => {
            let artifact = Artifact::voice_blend(bytes);
            let path = write_artifact(&artifact, output)?;
            print_saved("Combined voice", &path, &artifact);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn caption(
    client: &KokoroClient,
    req: CaptionRequest,
    audio_output: Option<&str>,
    srt_output: Option<&str>,
) -> Result<()> {
    let resp = send(client, &req.into(), "Generating captioned speech...").await?;
    let captioned = match resp.result.into_success().map_err(describe)? {
        NormalizedResult::Captioned(c) => c,
        other => return Err(unexpected(other)),
    };

    let audio = Artifact::captioned_audio(captioned.audio);
    let path = write_artifact(&audio, audio_output)?;
    print_saved("Audio", &path, &audio);

    let Some(timestamps) = captioned.timestamps else {
        println!("{} No timestamps returned", "!".bright_yellow());
        return Ok(());
    };

    let srt = to_srt(&timestamps);
    match srt_output {
        Some(p) => {
            let artifact = Artifact::subtitles(srt);
            let path = write_artifact(&artifact, Some(p))?;
            print_saved("Subtitles", &path, &artifact);
        }
        None => {
            print_separator();
            print!("{}", srt);
            print_separator();
        }
    }
    Ok(())
}

async fn phonemize(client: &KokoroClient, req: PhonemizeRequest) -> Result<()> {
    let resp = send(client, &req.into(), "Phonemizing...").await?;
    match resp.result.into_success().map_err(describe)? {
        NormalizedResult::Phonemes(PhonemeResult { phonemes, tokens }) => {
            println!("{}", phonemes);
            match tokens {
                Some(tokens) => println!("{} {}", "Tokens:".bold(), tokens),
                None => println!("{} none", "Tokens:".bold()),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// Sends `op` behind a spinner and reports job bookkeeping
async fn send(client: &KokoroClient, op: &Operation, message: &str) -> Result<KokoroResponse> {
    let endpoint = client.config().endpoint()?.clone();
    println!("Sending request to {}...", endpoint);

    let mut spinner = Spinner::new(Spinners::Dots, message.to_string());
    let result = client.execute(op).await;
    match &result {
        Ok(_) => spinner.stop_and_persist("🚀", "Done.".to_string()),
        Err(_) => spinner.stop_and_persist("💥", "Failed.".to_string()),
    }

    let resp = result.map_err(describe)?;
    if let Some(job) = &resp.job {
        report_job(job);
    }
    Ok(resp)
}

fn report_job(job: &JobInfo) {
    println!("Job ID: {}, Status: {}", job.id, job.status);
    if job.status.is_pending() {
        println!(
            "{} Job still in progress; this client expects a runsync endpoint or a completed job",
            "!".bright_yellow()
        );
    }
}

/// Adds the detail a user needs to act on a failure
fn describe(err: KokoroError) -> anyhow::Error {
    match err {
        KokoroError::UnrecognizedShape { raw } => anyhow!(
            "Unexpected response format:\n{}",
            serde_json::to_string_pretty(&raw).unwrap_or_else(|_| raw.to_string())
        ),
        KokoroError::HttpStatus { status, body } => {
            anyhow!("Request failed: HTTP {}\nResponse: {}", status, body)
        }
        KokoroError::TransportError(msg) => anyhow!("Request failed: {}", msg),
        other => other.into(),
    }
}

fn unexpected(result: NormalizedResult) -> anyhow::Error {
    match result.into_success() {
        Err(e) => describe(e),
        Ok(other) => anyhow!("Unexpected result for this command: {:?}", other),
    }
}
