use log::{error, info};
use multipart_body::{content_type, generate_boundary, FilePart, MultipartWriter};
use std::path::Path;

fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let input = std::env::var("INPUT_FILE").expect("INPUT_FILE must be set");
    let output = std::env::var("OUTPUT_FILE").expect("OUTPUT_FILE must be set");
    let field_name = std::env::var("FIELD_NAME").unwrap_or_else(|_| "file".to_string());
    let mime_type =
        std::env::var("MIME_TYPE").unwrap_or_else(|_| "application/octet-stream".to_string());

    // FORM_FIELDS=user=alice,album=holiday
    let fields: Vec<(String, String)> = std::env::var("FORM_FIELDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|kv| {
            let mut it = kv.splitn(2, '=');
            match (it.next(), it.next()) {
                (Some(k), Some(v)) if !k.is_empty() => Some((k.to_string(), v.to_string())),
                _ => None,
            }
        })
        .collect();

    let filename = Path::new(&input)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.clone());

    let boundary = generate_boundary();
    let file = FilePart::new(field_name, filename, mime_type);

    match MultipartWriter::new(boundary.clone())
        .fields(fields)
        .write_file(&file, &input, &output)
    {
        Ok(len) => {
            let header = content_type(&boundary).expect("Generated boundary is a valid header");
            info!("Wrote {} bytes to {}", len, output);
            println!("Content-Type: {}", header.to_str().unwrap_or_default());
            println!("Content-Length: {}", len);
        }

        Err(e) => {
            error!("Failed to write body: {}", e);
            std::process::exit(1);
        }
    }
}
