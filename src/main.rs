use inventory_visual::dialogs::{DialogHost, NotificationKind, Notifier, PhotoGalleryDialog};
use inventory_visual::{AppConfig, AppError, JsonRpcClient, LotService, PhotoUploadService};
use photo_annotator::{PreviewStore, SourceImage};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "usage: inventory-visual <config.toml> <quant_id> <image-path> [photo name]";

/// Prints dialog notifications to the terminal
struct ConsoleHost;

impl Notifier for ConsoleHost {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Danger | NotificationKind::Warning => {
                eprintln!("[{}] {}", kind.as_str(), message)
            }
            NotificationKind::Success | NotificationKind::Info => {
                println!("[{}] {}", kind.as_str(), message)
            }
        }
    }
}

impl DialogHost for ConsoleHost {
    fn close(&self) {
        log::debug!("Dialog closed");
    }

    async fn reload(&self) {
        log::debug!("Nothing to reload on the console");
    }
}

struct Args {
    config: PathBuf,
    quant_id: i64,
    image: PathBuf,
    photo_name: Option<String>,
}

fn parse_args() -> Result<Args, AppError> {
    let mut args = std::env::args().skip(1);
    let (Some(config), Some(quant_id), Some(image)) = (args.next(), args.next(), args.next())
    else {
        return Err(AppError::Validation(USAGE.to_string()));
    };
    let quant_id = quant_id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid quant id: {}", quant_id)))?;
    Ok(Args {
        config: PathBuf::from(config),
        quant_id,
        image: PathBuf::from(image),
        photo_name: args.next(),
    })
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = AppConfig::load(&args.config)?;
    let client = Arc::new(JsonRpcClient::new(&config.rpc)?);
    let lots = LotService::new(Arc::clone(&client), config.upload.model.clone());

    let photos = lots.get_lot_photos(args.quant_id).await?;
    log::info!(
        "Lot {} ({}) has {} photos",
        photos.lot_name,
        photos.product_name,
        photos.photos.len()
    );

    let uploads = PhotoUploadService::new(lots, config.compression, &config.upload);
    let dialog = PhotoGalleryDialog::new(
        args.quant_id,
        photos,
        Arc::new(uploads),
        Arc::new(ConsoleHost),
        PreviewStore::new(),
    );

    dialog.toggle_upload_form();
    if let Some(name) = args.photo_name {
        dialog.set_photo_name(name);
    }
    let source = SourceImage::from_path(&args.image)?;
    dialog.with_session(|session| {
        session.select_image(source);
    });

    let receipt = dialog.upload().await?;
    log::info!(
        "Stored {} at {}x{}",
        receipt.photo_name,
        receipt.width,
        receipt.height
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e.user_message(USAGE));
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
