use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use listing_desk::config::AppConfig;
use listing_desk::error::{Notice, SubmitError};
use listing_desk::form::{price_words, DimensionEngine, Dimensions, ListingSchema, PropertyForm};
use listing_desk::models::{AreaUnit, ImageFile, Labelled, LengthUnit, PropertyDraft};
use listing_desk::relay::{
    ContactForm, ContactMailer, EmailCaptureForm, EmailJsClient, InvestorContactForm, LeadForm,
};
use listing_desk::stores::{
    BlobStore, LocalBlobStore, LocalRecordStore, MemoryBlobStore, MemoryRecordStore, RecordStore,
};
use listing_desk::submit::ListingSubmitter;

#[derive(Parser)]
#[command(name = "listing-desk", about = "Property listing intake and lead capture")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a draft, upload its images and store the listing
    Submit {
        /// Draft listing as JSON
        draft: PathBuf,
        /// Image to attach (repeat for up to five)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Run against in-memory stores and write nothing to disk
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the normalized draft or its field errors
    Validate {
        draft: PathBuf,
    },
    /// Spell a rupee amount in Indian English
    PriceWords {
        price: String,
    },
    /// Reconcile length, breadth and area
    Convert {
        #[arg(long)]
        length: Option<String>,
        #[arg(long)]
        breadth: Option<String>,
        #[arg(long)]
        area: Option<String>,
        /// feet or meters
        #[arg(long, default_value = "feet", value_parser = parse_label::<LengthUnit>)]
        unit: LengthUnit,
        /// Sq. Feet, Sq. Yards, Sq. Meters, Acres or Guntas
        #[arg(long, default_value = "Sq. Feet", value_parser = parse_label::<AreaUnit>)]
        area_unit: AreaUnit,
        /// Re-express length and breadth in another unit afterwards
        #[arg(long, value_parser = parse_label::<LengthUnit>)]
        to_unit: Option<LengthUnit>,
        /// Re-express the area in another unit afterwards
        #[arg(long, value_parser = parse_label::<AreaUnit>)]
        to_area_unit: Option<AreaUnit>,
    },
    /// Send the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Send an investor enquiry
    Investor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Join a waitlist by email
    EarlyAccess {
        email: String,
        #[arg(long, default_value = "early-access")]
        form_id: String,
    },
}

fn parse_label<T: Labelled>(text: &str) -> Result<T, String> {
    T::from_label(text).ok_or_else(|| {
        let options: Vec<&str> = T::ALL.iter().map(|v| v.label()).collect();
        format!("expected one of: {}", options.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Submit {
            draft,
            images,
            dry_run,
        } => submit_listing(&config, &draft, &images, dry_run).await,
        Commands::Validate { draft } => {
            let draft = read_draft(&draft).await?;
            let schema = ListingSchema::new(&config.default_city);
            match schema.normalize(&draft) {
                Ok(normalized) => println!("{}", serde_json::to_string_pretty(&normalized)?),
                Err(errors) => {
                    println!("{}", serde_json::to_string_pretty(&errors)?);
                    anyhow::bail!("Draft has {} invalid field(s)", errors.len());
                }
            }
            Ok(())
        }
        Commands::PriceWords { price } => {
            println!("{}", price_words(&price));
            Ok(())
        }
        Commands::Convert {
            length,
            breadth,
            area,
            unit,
            area_unit,
            to_unit,
            to_area_unit,
        } => {
            let mut engine = DimensionEngine::new(Dimensions {
                length_unit: unit,
                area_unit,
                ..Default::default()
            });
            if let Some(length) = length {
                engine.set_length(length);
            }
            if let Some(breadth) = breadth {
                engine.set_breadth(breadth);
            }
            if let Some(area) = area {
                engine.set_area(area);
            }
            if let Some(unit) = to_unit {
                engine.set_length_unit(unit);
            }
            if let Some(unit) = to_area_unit {
                engine.set_area_unit(unit);
            }
            println!("{}", serde_json::to_string_pretty(engine.dimensions())?);
            Ok(())
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let mut form = ContactForm {
                user_name: name,
                user_email: email,
                subject,
                message,
            };
            send_lead(&config, &mut form).await
        }
        Commands::Investor {
            name,
            email,
            company,
            message,
        } => {
            let mut form = InvestorContactForm {
                name,
                email,
                company,
                message,
            };
            send_lead(&config, &mut form).await
        }
        Commands::EarlyAccess { email, form_id } => {
            let mut form = EmailCaptureForm::new(form_id);
            form.email = email;
            send_lead(&config, &mut form).await
        }
    }
}

async fn read_draft(path: &Path) -> Result<PropertyDraft> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse draft {}", path.display()))
}

async fn read_image(path: &Path) -> Result<ImageFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageFile::new(name, content_type_for(path), bytes))
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

async fn submit_listing(config: &AppConfig, draft: &Path, images: &[PathBuf], dry_run: bool) -> Result<()> {
    let draft = read_draft(draft).await?;
    let mut form = PropertyForm::from_draft(ListingSchema::new(&config.default_city), draft);

    if !form.price_words().is_empty() {
        info!("Price: {}", form.price_words());
    }

    for path in images {
        let file = read_image(path).await?;
        if let Err(violations) = form.add_image(file) {
            for v in &violations {
                warn!("{}: {}", path.display(), v);
            }
            anyhow::bail!("Image {} was rejected", path.display());
        }
    }

    let (records, blobs): (Arc<dyn RecordStore>, Arc<dyn BlobStore>) = if dry_run {
        info!("Dry run: using in-memory stores");
        (Arc::new(MemoryRecordStore::new()), Arc::new(MemoryBlobStore::new()))
    } else {
        (
            Arc::new(LocalRecordStore::new(config.storage_root.join("records"))),
            Arc::new(LocalBlobStore::new(
                config.storage_root.join("blobs"),
                config.public_base_url.clone(),
            )),
        )
    };

    let submitter = ListingSubmitter::new(records, blobs).with_timeout(config.submit_timeout);
    match submitter.submit_form(form).await {
        Ok(document) => {
            let notice = Notice::LISTED;
            info!("{} {}", notice.title, notice.description);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Err(err) => {
            let notice = err.notice();
            warn!("{}: {}", notice.title, notice.description);
            if let SubmitError::Validation(errors) = &err {
                println!("{}", serde_json::to_string_pretty(errors)?);
            }
            Err(err.into())
        }
    }
}

async fn send_lead<F: LeadForm + Send>(config: &AppConfig, form: &mut F) -> Result<()> {
    let relay = Arc::new(EmailJsClient::new(config.relay.endpoint.clone())?);
    let mailer = ContactMailer::new(relay, config.relay.clone());

    match mailer.send(form).await {
        Ok(()) => {
            let notice = Notice::MESSAGE_SENT;
            info!("{} {}", notice.title, notice.description);
            Ok(())
        }
        Err(err) => {
            let notice = err.notice();
            warn!("{}: {}", notice.title, notice.description);
            Err(err.into())
        }
    }
}
