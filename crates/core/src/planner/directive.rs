//! Typed encoder directives and the builder that renders them to tokens.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::media::FrameRate;

/// Directives that may appear at most once in a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnceKey {
    Quality,
}

/// One directive of an encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Regenerate missing presentation timestamps of the next input.
    RegeneratePts,
    /// An input file.
    Input(PathBuf),
    /// Container-level metadata tag.
    GlobalMetadata { key: String, value: String },
    /// Encoder (or `copy`) for an output stream.
    Codec { output: usize, encoder: String },
    FrameRate { output: usize, rate: FrameRate },
    FrameSize { output: usize, width: u32, height: u32 },
    Channels { output: usize, channels: u32 },
    SampleRate { output: usize, sample_rate: u32 },
    /// Constant rate factor.
    Quality(u8),
    /// Codec tag (fourcc) of an output stream.
    Tag { output: usize, tag: &'static str },
    /// Binds a source stream to the next output slot.
    Map { input: usize, stream: usize },
    StreamMetadata { output: usize, key: String, value: String },
    /// Disposition flags of an output stream; empty clears them.
    Disposition { output: usize, flags: Vec<&'static str> },
}

impl Directive {
    pub fn once_key(&self) -> Option<OnceKey> {
        match self {
            Self::Quality(_) => Some(OnceKey::Quality),
            _ => None,
        }
    }

    /// Renders the directive as an option and its value.
    pub fn to_tokens(&self) -> Vec<String> {
        match self {
            Self::RegeneratePts => vec!["-fflags".to_string(), "+genpts".to_string()],
            Self::Input(path) => vec!["-i".to_string(), path.to_string_lossy().to_string()],
            Self::GlobalMetadata { key, value } => {
                vec!["-metadata".to_string(), format!("{}={}", key, value)]
            }
            Self::Codec { output, encoder } => vec![format!("-c:{}", output), encoder.clone()],
            Self::FrameRate { output, rate } => vec![format!("-r:{}", output), rate.to_string()],
            Self::FrameSize {
                output,
                width,
                height,
            } => vec![format!("-s:{}", output), format!("{}x{}", width, height)],
            Self::Channels { output, channels } => {
                vec![format!("-ac:{}", output), channels.to_string()]
            }
            Self::SampleRate {
                output,
                sample_rate,
            } => vec![format!("-ar:{}", output), sample_rate.to_string()],
            Self::Quality(crf) => vec!["-crf".to_string(), crf.to_string()],
            Self::Tag { output, tag } => vec![format!("-tag:{}", output), tag.to_string()],
            Self::Map { input, stream } => vec!["-map".to_string(), format!("{}:{}", input, stream)],
            Self::StreamMetadata { output, key, value } => vec![
                format!("-metadata:s:{}", output),
                format!("{}={}", key, value),
            ],
            Self::Disposition { output, flags } => {
                let value = if flags.is_empty() {
                    "0".to_string()
                } else {
                    flags.join("+")
                };
                vec![format!("-disposition:{}", output), value]
            }
        }
    }
}

/// Accumulates directives in order, emitting once-only ones a single time.
#[derive(Debug, Default)]
pub struct CommandBuilder {
    tokens: Vec<String>,
    emitted: BTreeSet<OnceKey>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw tokens, such as global tool flags.
    pub fn extend_raw(&mut self, tokens: impl IntoIterator<Item = String>) {
        self.tokens.extend(tokens);
    }

    /// Appends a directive. Returns false when a once-only directive was
    /// already emitted and this one was skipped.
    pub fn push(&mut self, directive: Directive) -> bool {
        if let Some(key) = directive.once_key() {
            if !self.emitted.insert(key) {
                return false;
            }
        }
        self.tokens.extend(directive.to_tokens());
        true
    }

    pub fn has_emitted(&self, key: OnceKey) -> bool {
        self.emitted.contains(&key)
    }

    pub fn build(self) -> Vec<String> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_directives() {
        assert_eq!(
            Directive::Codec {
                output: 1,
                encoder: "copy".to_string()
            }
            .to_tokens(),
            vec!["-c:1", "copy"]
        );
        assert_eq!(
            Directive::Map { input: 0, stream: 3 }.to_tokens(),
            vec!["-map", "0:3"]
        );
        assert_eq!(
            Directive::FrameRate {
                output: 0,
                rate: FrameRate::new(24000, 1001).unwrap()
            }
            .to_tokens(),
            vec!["-r:0", "24000/1001"]
        );
        assert_eq!(
            Directive::StreamMetadata {
                output: 2,
                key: "language".to_string(),
                value: "eng".to_string()
            }
            .to_tokens(),
            vec!["-metadata:s:2", "language=eng"]
        );
    }

    #[test]
    fn test_render_disposition() {
        let set = Directive::Disposition {
            output: 0,
            flags: vec!["default", "forced"],
        };
        assert_eq!(set.to_tokens(), vec!["-disposition:0", "default+forced"]);
        let cleared = Directive::Disposition {
            output: 1,
            flags: vec![],
        };
        assert_eq!(cleared.to_tokens(), vec!["-disposition:1", "0"]);
    }

    #[test]
    fn test_quality_emitted_once() {
        let mut builder = CommandBuilder::new();
        assert!(!builder.has_emitted(OnceKey::Quality));
        assert!(builder.push(Directive::Quality(23)));
        assert!(builder.push(Directive::Map { input: 0, stream: 0 }));
        assert!(!builder.push(Directive::Quality(23)));
        assert!(builder.has_emitted(OnceKey::Quality));
        assert_eq!(builder.build(), vec!["-crf", "23", "-map", "0:0"]);
    }
}
