use clap::{Parser, Subcommand};
use kokoro_client::AudioFormat;

use crate::utils::parse_speed;

pub const DEFAULT_TEXT: &str = "Hello, this is a test of the Kokoro TTS system.";

/// Command line arguments for the Kokoro client
#[derive(Parser, Debug)]
#[clap(
    name = "kokoro",
    about = "Client for Kokoro text-to-speech endpoints",
    version
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Full endpoint URL (e.g. https://api.runpod.ai/v2/YOUR_ENDPOINT_ID/runsync)
    #[arg(long, global = true, env = "KOKORO_URL")]
    pub url: Option<String>,

    /// RunPod endpoint id; expands to its runsync URL when --url is not given
    #[arg(long, global = true, env = "ENDPOINT_ID", hide_env_values = true)]
    pub endpoint_id: Option<String>,

    /// API key, sent as a bearer token
    #[arg(long, global = true, env = "RUNPOD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// TOML file with endpoint and default settings
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize speech and save the audio
    Speak {
        /// Text to synthesize
        #[arg(default_value = DEFAULT_TEXT)]
        text: String,

        /// Voice id, or a blend such as af_bella+af_sky
        #[arg(long)]
        voice: Option<String>,

        /// Speech speed (0.25-4.0)
        #[arg(long, value_parser = parse_speed)]
        speed: Option<f32>,

        /// Output format: mp3, wav, opus, flac or pcm
        #[arg(long)]
        format: Option<AudioFormat>,

        #[arg(long)]
        model: Option<String>,

        /// Output file (default: output.<format>)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List available voices
    Voices,
    /// Blend voices into a downloadable voice file
    Combine {
        /// Voices joined by '+' or ','
        voices: String,

        /// Output file (default: combined_voice.pt)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Synthesize speech with word timestamps and write SRT subtitles
    Caption {
        /// Text to synthesize
        text: String,

        #[arg(long)]
        voice: Option<String>,

        /// Audio file (default: captioned.mp3)
        #[arg(long)]
        audio_output: Option<String>,

        /// Subtitle file; the SRT is printed when omitted
        #[arg(long)]
        srt_output: Option<String>,
    },
    /// Convert text to phonemes
    Phonemize {
        text: String,

        /// Language code (a = American English, b = British English, ...)
        #[arg(long)]
        language: Option<String>,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
