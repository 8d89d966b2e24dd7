use crate::infra::{console_backends, parse_page};
use clap::Args;
use provider_risk::error::AppError;
use provider_risk::providers::{
    ProviderError, ProviderFilter, ProviderForm, ProviderId, ProviderPage,
};
use provider_risk::screening::{
    ScreeningSession, ScreeningTarget, SessionView, SourceCatalog,
};
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ProviderListArgs {
    /// Match legal name or trade name (any case) or tax id
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Only providers registered in this country
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Page to print (10 providers per page)
    #[arg(long, default_value = "1", value_parser = parse_page)]
    pub(crate) page: usize,
}

/// Provider form fields. Fields left out keep their current value on edit and
/// stay blank on add.
#[derive(Args, Debug, Default)]
pub(crate) struct ProviderFieldArgs {
    #[arg(long)]
    pub(crate) legal_name: Option<String>,
    #[arg(long)]
    pub(crate) trade_name: Option<String>,
    /// 11-digit tax id
    #[arg(long)]
    pub(crate) tax_id: Option<String>,
    #[arg(long)]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Must start with http:// or https://
    #[arg(long)]
    pub(crate) website: Option<String>,
    #[arg(long)]
    pub(crate) address: Option<String>,
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Annual revenue in USD
    #[arg(long)]
    pub(crate) annual_revenue: Option<String>,
}

impl ProviderFieldArgs {
    pub(crate) fn apply_to(self, mut form: ProviderForm) -> ProviderForm {
        let overrides = [
            (self.legal_name, &mut form.legal_name),
            (self.trade_name, &mut form.trade_name),
            (self.tax_id, &mut form.tax_id),
            (self.phone, &mut form.phone),
            (self.email, &mut form.email),
            (self.website, &mut form.website),
            (self.address, &mut form.address),
            (self.country, &mut form.country),
            (self.annual_revenue, &mut form.annual_revenue),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        form
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Provider to screen
    #[arg(long)]
    pub(crate) provider: u64,
    /// Source to toggle, applied in order (repeatable, e.g. --source ofac --source world-bank)
    #[arg(long = "source", required = true)]
    pub(crate) sources: Vec<String>,
    /// Page shown for every match table
    #[arg(long, default_value = "1", value_parser = parse_page)]
    pub(crate) page: usize,
}

pub(crate) fn run_sources() -> Result<(), AppError> {
    print!("{}", render_catalog(SourceCatalog::standard()));
    Ok(())
}

pub(crate) async fn run_provider_list(args: ProviderListArgs) -> Result<(), AppError> {
    let backends = console_backends()?;
    let directory = backends.directory;
    directory.reload().await?;

    let filter = ProviderFilter {
        search: args.search.unwrap_or_default(),
        country: args.country.unwrap_or_default(),
    };
    let page = directory.query(&filter, args.page);
    print!("{}", render_provider_page(&page, &directory.countries()));
    Ok(())
}

pub(crate) async fn run_provider_add(fields: ProviderFieldArgs) -> Result<(), AppError> {
    let backends = console_backends()?;
    let form = fields.apply_to(ProviderForm::default());

    report_rejection(backends.directory.add(&form).await)?;
    println!("Provider created");
    Ok(())
}

pub(crate) async fn run_provider_edit(id: u64, fields: ProviderFieldArgs) -> Result<(), AppError> {
    let backends = console_backends()?;
    let id = ProviderId(id);
    let current = backends.directory.lookup(id).await?;
    let form = fields.apply_to(ProviderForm::from_provider(&current));

    report_rejection(backends.directory.edit(id, &form).await)?;
    println!("Provider {id} updated");
    Ok(())
}

pub(crate) async fn run_provider_remove(id: u64) -> Result<(), AppError> {
    let backends = console_backends()?;
    let id = ProviderId(id);

    backends.directory.remove(id).await?;
    println!("Provider {id} deleted");
    Ok(())
}

pub(crate) async fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let backends = console_backends()?;
    let catalog = backends.aggregator.catalog();
    let provider = backends.directory.lookup(ProviderId(args.provider)).await?;
    let target = ScreeningTarget::from_provider(&provider)
        .ok_or(ProviderError::NotFound(ProviderId(args.provider)))?;

    let mut session = ScreeningSession::opened(target);
    let mut ticket = None;
    for source in &args.sources {
        if !catalog.contains(source) {
            eprintln!("Skipping unknown source '{source}'");
            continue;
        }
        // Only the last scheduled run survives; earlier ones would be stale.
        if let Some(next) = session.toggle(source) {
            ticket = Some(next);
        } else if session.selection().is_empty() {
            ticket = None;
        }
    }

    let Some(ticket) = ticket else {
        println!("No sources selected; nothing to screen");
        return Ok(());
    };

    info!(
        provider_id = %ticket.target().provider_id,
        sources = ?ticket.selection().ids(),
        "running screening"
    );
    let outcome = ticket.run(&backends.aggregator).await;
    session.apply(&ticket, outcome);

    let entries = session
        .status()
        .result()
        .map(|result| result.sources.len())
        .unwrap_or_default();
    for entry in 0..entries {
        session.set_page(entry, args.page);
    }

    print!("{}", render_session(&session.view(catalog)));
    Ok(())
}

fn report_rejection(outcome: Result<(), ProviderError>) -> Result<(), ProviderError> {
    if let Err(ProviderError::Validation(errors)) = &outcome {
        for (field, message) in errors.fields() {
            eprintln!("  {field}: {message}");
        }
    }
    outcome
}

pub(crate) fn render_catalog(catalog: &SourceCatalog) -> String {
    let mut lines = vec!["Screening sources".to_string()];
    for descriptor in catalog.descriptors() {
        lines.push(format!(
            "- {} ({}) -> {}",
            descriptor.id, descriptor.display_name, descriptor.api_identifier
        ));
    }
    finish(lines)
}

pub(crate) fn render_provider_page(page: &ProviderPage, countries: &[String]) -> String {
    if page.providers.is_empty() {
        return "No providers found\n".to_string();
    }

    let mut lines = vec![format!(
        "Providers (page {} of {}, {} total)",
        page.page.page, page.page.total_pages, page.total
    )];
    for provider in &page.providers {
        let id = provider
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "- [{id}] {} | {} | tax id {} | {} | {} | revenue {:.2} | updated {}",
            provider.legal_name,
            non_blank(&provider.trade_name),
            provider.tax_id,
            non_blank(&provider.email),
            non_blank(&provider.country),
            provider.annual_revenue,
            non_blank(&provider.last_updated),
        ));
    }
    if !countries.is_empty() {
        lines.push(format!("Countries: {}", countries.join(", ")));
    }
    finish(lines)
}

pub(crate) fn render_session(view: &SessionView) -> String {
    let mut lines = Vec::new();
    if let Some(target) = &view.target {
        lines.push(format!(
            "Screening {} (provider {})",
            target.display_name, target.provider_id
        ));
    }
    lines.push(format!("Sources: {}", view.selection.ids().join(", ")));

    if let Some(message) = &view.message {
        lines.push(message.clone());
        return finish(lines);
    }

    let Some(result) = &view.result else {
        lines.push(format!("Status: {}", view.status));
        return finish(lines);
    };

    lines.push(format!(
        "{}: {} ({} total hits)",
        result.headline, result.entity_name, result.total_hits
    ));
    for row in &result.summary {
        lines.push(format!(
            "  {:<24} {:>5}  {}",
            row.display_name,
            row.hits,
            row.status.label()
        ));
    }

    for table in &result.tables {
        lines.push(String::new());
        lines.push(format!(
            "{} ({} hits, page {} of {})",
            table.display_name, table.hits, table.page.page, table.page.total_pages
        ));
        lines.push(format!("  # | {}", table.headers.join(" | ")));
        for row in &table.rows {
            lines.push(format!("  {} | {}", row.number, row.cells.join(" | ")));
        }
    }
    finish(lines)
}

fn non_blank(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
