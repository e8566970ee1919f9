use lead_core::enums::{InputKind, Mode};
use lead_engine::{EngineError, SingleInput, export};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SingleArgs;
use crate::context::{AppContext, Workbench};
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct SingleResponse {
    history_id: String,
    mode: Mode,
    kind: InputKind,
    input: String,
    result: String,
    status: String,
    email: String,
    linkedin_url: String,
    message: Option<String>,
    cached: bool,
    stored: bool,
    duplicate: bool,
}

/// The form fields for `mode`; the others are ignored.
pub fn input_for(mode: Mode, args: &SingleArgs) -> SingleInput {
    match mode {
        Mode::Verify => SingleInput::email(&args.email),
        Mode::Enrich | Mode::Linkedin => SingleInput::person(&args.name, &args.company),
    }
}

/// Handle `leads single <mode>`.
pub async fn handle(args: &SingleArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mode = Mode::from(args.mode);
    let input = input_for(mode, args);

    let Workbench {
        processor,
        owner,
        book,
        ..
    } = ctx.workbench();

    let spinner = Progress::spinner(&format!("{mode}: {}", input.label(mode)));
    let outcome = if args.retry {
        processor.retry_single(mode, &input).await
    } else {
        processor.run_single(mode, &input).await
    };
    spinner.finish_clear();
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(EngineError::Validation(message)) => anyhow::bail!("single {mode}: {message}"),
        Err(error) => return Err(error.into()),
    };

    let done = book
        .finalize_single(mode, &input, &outcome, args.retry, owner)
        .await;

    let record = export::single_export_record(mode, &outcome);
    let cell = |column: &str| {
        record
            .columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| record.rows.first().and_then(|row| row.get(i)))
            .cloned()
            .unwrap_or_default()
    };

    output(
        &SingleResponse {
            history_id: done.entry.id,
            mode,
            kind: InputKind::Single,
            input: done.entry.input,
            result: outcome.result_label(mode),
            status: outcome.row.status.as_str().to_owned(),
            email: cell(export::ENRICHED_EMAIL),
            linkedin_url: cell(export::LINKEDIN_URL),
            message: outcome.message,
            cached: outcome.cached,
            stored: done.stored,
            duplicate: done.duplicate,
        },
        flags.format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ModeArg;

    #[test]
    fn verify_ignores_name_and_company() {
        let args = SingleArgs {
            mode: ModeArg::Verify,
            name: "Ada".into(),
            company: "Analytical".into(),
            email: " ada@analytical.io ".into(),
            retry: false,
        };
        let input = input_for(Mode::Verify, &args);
        assert_eq!(input, SingleInput::email("ada@analytical.io"));
        assert_eq!(input.label(Mode::Verify), "ada@analytical.io");
    }

    #[test]
    fn enrich_uses_the_person_fields() {
        let args = SingleArgs {
            mode: ModeArg::Enrich,
            name: "Ada Lovelace".into(),
            company: "Analytical".into(),
            email: String::new(),
            retry: true,
        };
        let input = input_for(Mode::Enrich, &args);
        assert_eq!(input.label(Mode::Enrich), "Ada Lovelace @ Analytical");
    }
}
