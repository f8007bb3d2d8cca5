//! html_merge engine: folder inlining, MHTML packaging and the conversion client.
mod backend;
mod batch;
mod client;
mod convert;
mod decode;
mod engine;
mod filename;
mod inline;
mod inspect;
mod mhtml;
mod persist;
mod types;

pub use backend::{summarize, ConversionBackend, FolderMergeBackend};
pub use batch::{batch_convert, output_names, plan_batch, BatchItem, BatchReport, ProgressSink};
pub use client::{ConversionClient, ProgressListener, ResultListener, SubmitError};
pub use convert::{convert_folder, find_main_page, ConvertError, FolderOutcome, MergeSettings};
pub use decode::{declare_utf8, decode_html, DecodedHtml};
pub use engine::EngineHandle;
pub use filename::output_file_name;
pub use inline::{InlineStats, ResourceInliner};
pub use inspect::{summarize_page, PageSummary, ResourceKind, ResourceRef};
pub use mhtml::build_mhtml;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, WrittenFile};
pub use types::{EngineEvent, EngineFormat, RequestId};
