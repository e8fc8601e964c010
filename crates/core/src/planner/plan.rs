//! Compiles edited media entities into an encoder invocation.

use serde::Serialize;
use std::path::Path;
use tracing::debug;

use super::directive::{CommandBuilder, Directive};
use crate::compat::{self, decide_codec, CodecDecision};
use crate::config::RemuxConfig;
use crate::error::MediaError;
use crate::media::{extension_of, Container, Stream, StreamKind};

/// One top-level entry of a plan.
#[derive(Debug, Clone, Copy)]
pub enum PlanInput<'a> {
    /// A container; its own streams are planned from its probed file.
    Container(&'a Container),
    /// A standalone stream file.
    Stream(&'a Stream),
}

/// Per-plan encoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSettings {
    /// Constant rate factor, emitted once for the whole command.
    pub crf: Option<u8>,
}

impl PlanSettings {
    pub fn with_crf(crf: u8) -> Self {
        Self { crf: Some(crf) }
    }
}

/// A stream that made it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStream {
    pub input: usize,
    pub stream: usize,
    pub output: usize,
    pub kind: StreamKind,
    pub decision: CodecDecision,
}

/// An encoder invocation, minus the output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub args: Vec<String>,
    pub streams: Vec<PlannedStream>,
}

impl Plan {
    /// Number of `-map` directives in the plan.
    pub fn mapped_count(&self) -> usize {
        self.streams.len()
    }
}

/// One resolved input clause.
struct InputClause<'a> {
    path: &'a Path,
    regenerate_pts: bool,
    streams: Vec<&'a Stream>,
}

/// Builds encoder commands from containers and streams.
pub struct Planner<'c> {
    config: &'c RemuxConfig,
}

impl<'c> Planner<'c> {
    pub fn new(config: &'c RemuxConfig) -> Self {
        Self { config }
    }

    /// Plans writing `inputs` into `target`.
    ///
    /// Each bound container and each standalone stream becomes one input
    /// clause, in order. Standalone streams held by a container follow that
    /// container's own clause. At most one bound container may take part.
    pub fn plan(
        &self,
        inputs: &[PlanInput<'_>],
        target: &Path,
        settings: PlanSettings,
    ) -> Result<Plan, MediaError> {
        if inputs.is_empty() {
            return Err(MediaError::planner("no inputs to plan"));
        }
        let extension = target_extension(target)?;

        let bound = inputs
            .iter()
            .filter(|i| matches!(i, PlanInput::Container(c) if c.is_bound()))
            .count();
        if bound > 1 {
            return Err(MediaError::planner(format!(
                "{} bound containers given; only one container can be written with loose streams",
                bound
            )));
        }

        let mut clauses = Vec::with_capacity(inputs.len());
        let mut metadata = None;
        for input in inputs {
            match input {
                PlanInput::Container(container) => {
                    if let Some(foreign) = container.foreign_streams().next() {
                        return Err(MediaError::planner(format!(
                            "stream {} belongs to another container ({})",
                            foreign.index(),
                            foreign
                                .source_path()
                                .map(|p| p.display().to_string())
                                .unwrap_or_default()
                        )));
                    }
                    if metadata.is_none() {
                        metadata = Some(container.metadata());
                    }
                    if let Some(path) = container.default_path() {
                        clauses.push(InputClause {
                            path,
                            regenerate_pts: container
                                .default_extension()
                                .is_some_and(|e| self.config.needs_regenerated_pts(&e)),
                            streams: container.own_streams().collect(),
                        });
                    }
                    for stream in container.outer_streams() {
                        clauses.push(loose_stream_clause(stream)?);
                    }
                }
                PlanInput::Stream(stream) => clauses.push(loose_stream_clause(stream)?),
            }
        }

        let mut builder = self.start_command(&clauses);
        if let Some(metadata) = metadata {
            for (key, value) in metadata {
                builder.push(Directive::GlobalMetadata {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        let mut planned = Vec::new();
        for (input, clause) in clauses.iter().enumerate() {
            for stream in &clause.streams {
                if let Some(entry) =
                    self.plan_stream(&mut builder, stream, input, planned.len(), &extension, settings)?
                {
                    planned.push(entry);
                }
            }
        }

        self.finish(builder, planned)
    }

    /// Plans extracting an inner stream into a standalone file.
    pub fn plan_extraction(
        &self,
        stream: &Stream,
        target: &Path,
        settings: PlanSettings,
    ) -> Result<Plan, MediaError> {
        let origin = stream.origin().ok_or_else(|| {
            MediaError::operation_mode("extract", "only inner streams can be extracted")
        })?;
        let extension = target_extension(target)?;
        if !compat::is_supported_extension(stream.kind(), &extension) {
            return Err(MediaError::unsupported_extension(extension, stream.kind()));
        }

        let clauses = [InputClause {
            path: origin.container_path.as_path(),
            regenerate_pts: origin
                .container_extension
                .as_deref()
                .is_some_and(|e| self.config.needs_regenerated_pts(e)),
            streams: vec![stream],
        }];
        let mut builder = self.start_command(&clauses);
        let planned = self
            .plan_stream(&mut builder, stream, 0, 0, &extension, settings)?
            .into_iter()
            .collect();
        self.finish(builder, planned)
    }

    /// Plans saving `container` into `target`: the container's own file
    /// first, then every standalone stream added to it.
    pub fn plan_container(
        &self,
        container: &Container,
        target: &Path,
        settings: PlanSettings,
    ) -> Result<Plan, MediaError> {
        self.plan(&[PlanInput::Container(container)], target, settings)
    }

    fn start_command(&self, clauses: &[InputClause<'_>]) -> CommandBuilder {
        let mut builder = CommandBuilder::new();
        builder.extend_raw(self.config.global_ffmpeg_args());
        for clause in clauses {
            if clause.regenerate_pts {
                builder.push(Directive::RegeneratePts);
            }
            builder.push(Directive::Input(clause.path.to_path_buf()));
        }
        builder
    }

    fn plan_stream(
        &self,
        builder: &mut CommandBuilder,
        stream: &Stream,
        input: usize,
        output: usize,
        extension: &str,
        settings: PlanSettings,
    ) -> Result<Option<PlannedStream>, MediaError> {
        let kind = stream.kind();
        if kind.is_container_specific()
            && stream.source_extension().as_deref() != Some(extension)
        {
            debug!(
                stream = stream.index(),
                kind = %kind,
                "Dropping container-specific stream"
            );
            return Ok(None);
        }

        let mut decision = decide_codec(stream, extension)?;
        if decision.is_copy() && stream.needs_filtering() {
            decision = CodecDecision::Reencode(stream.codec().clone());
        }

        builder.push(Directive::Codec {
            output,
            encoder: decision.encoder().to_string(),
        });
        if stream.changed_frame_rate() {
            if let Some(rate) = stream.frame_rate() {
                builder.push(Directive::FrameRate { output, rate });
            }
        }
        if stream.changed_frame_size() {
            if let (Some(width), Some(height)) = (stream.width(), stream.height()) {
                builder.push(Directive::FrameSize {
                    output,
                    width,
                    height,
                });
            }
        }
        if stream.changed_channels() {
            if let Some(channels) = stream.channels() {
                builder.push(Directive::Channels { output, channels });
            }
        }
        if stream.changed_sample_rate() {
            if let Some(sample_rate) = stream.sample_rate() {
                builder.push(Directive::SampleRate {
                    output,
                    sample_rate,
                });
            }
        }
        if let Some(crf) = settings.crf {
            builder.push(Directive::Quality(crf));
        }
        if kind == StreamKind::Video {
            let written = match &decision {
                CodecDecision::Copy => stream.codec().ffmpeg_encoder(),
                CodecDecision::Reencode(codec) => codec.ffmpeg_encoder(),
            };
            if compat::needs_hevc_tag(written, extension) {
                builder.push(Directive::Tag {
                    output,
                    tag: "hvc1",
                });
            }
        }
        builder.push(Directive::Map {
            input,
            stream: stream.index(),
        });
        for (key, value) in stream.metadata() {
            builder.push(Directive::StreamMetadata {
                output,
                key: key.clone(),
                value: value.clone(),
            });
        }
        if stream.changed_disposition() {
            let mut flags = Vec::new();
            if stream.is_default() {
                flags.push("default");
            }
            if stream.is_forced() {
                flags.push("forced");
            }
            builder.push(Directive::Disposition { output, flags });
        }

        Ok(Some(PlannedStream {
            input,
            stream: stream.index(),
            output,
            kind,
            decision,
        }))
    }

    fn finish(
        &self,
        builder: CommandBuilder,
        streams: Vec<PlannedStream>,
    ) -> Result<Plan, MediaError> {
        if streams.is_empty() {
            return Err(MediaError::planner("no streams selected for output"));
        }
        let args = builder.build();
        debug!(args = ?args, streams = streams.len(), "Planned encoder command");
        Ok(Plan { args, streams })
    }
}

fn loose_stream_clause<'a>(stream: &'a Stream) -> Result<InputClause<'a>, MediaError> {
    if stream.is_inner() {
        return Err(MediaError::planner(format!(
            "inner stream {} cannot be a top-level input",
            stream.index()
        )));
    }
    let path = stream
        .default_path()
        .ok_or(MediaError::MissingPath { what: "stream" })?;
    Ok(InputClause {
        path,
        regenerate_pts: false,
        streams: vec![stream],
    })
}

fn target_extension(target: &Path) -> Result<String, MediaError> {
    extension_of(target).ok_or_else(|| {
        MediaError::planner(format!("target {} has no extension", target.display()))
    })
}
