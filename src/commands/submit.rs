//! One-shot submission against a running console

use crate::cli::SubmitArgs;
use flashweb_client::{submit, HttpTransport};
use flashweb_core::{title_case, Action, Console, FieldId, FileUpload};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Fill a console form from the arguments, submit it and print the outcome
pub async fn run(args: SubmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let transport = match args.timeout {
        Some(secs) => HttpTransport::with_timeout(&args.url, Duration::from_secs(secs))?,
        None => HttpTransport::new(&args.url)?,
    };

    let mut console = Console::new();
    let action = Action::from(args.action);
    console.form.set_action(action);
    console.form.set_programmer(args.programmer.as_str());
    console.form.set_force(args.force);
    console.form.set_verbose(args.very_very_verbose);

    if let Some(path) = &args.file {
        if !console.visible_fields().contains(&FieldId::File) {
            log::warn!("{} does not take an image file, sending it anyway", action);
        }
        console.form.set_file(read_upload(path).await?);
    }

    let (action, request) = console.begin_submit();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("{} via {}", title_case(action.as_str()), transport.endpoint()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = submit(&transport, &request).await;
    pb.finish_and_clear();

    let succeeded = outcome.is_success();
    let id = console.apply(action, outcome);
    let Some(notification) = console.log.get(id) else {
        return Err("notification missing from log".into());
    };
    println!("{}", notification.text());

    if let Some(link) = &notification.link {
        match &args.output {
            Some(path) => {
                let bytes = transport.download(link).await?;
                tokio::fs::write(path, &bytes).await?;
                println!("Wrote {} bytes to {:?}", bytes.len(), path);
            }
            None => println!("Fetch it from {}", transport.resolve(link)?),
        }
    }

    if succeeded {
        Ok(())
    } else {
        Err(format!("{} failed", title_case(action.as_str())).into())
    }
}

/// Read an image file into an upload part
async fn read_upload(path: &Path) -> Result<FileUpload, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.bin".to_string());
    println!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(FileUpload::new(name, bytes))
}
