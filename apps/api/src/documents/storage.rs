use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Downloads the master résumé PDF.
pub async fn fetch_resume(s3: &S3Client, bucket: &str, key: &str) -> Result<Bytes, AppError> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Resume s3://{bucket}/{key} unavailable: {e}")))?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("Failed to read resume body: {e}")))?;
    Ok(data.into_bytes())
}

pub fn cover_letter_key(job_id: Uuid) -> String {
    format!("cover-letters/{job_id}.pdf")
}

/// Stores a rendered cover letter next to the job it was written for.
pub async fn archive_cover_letter(
    s3: &S3Client,
    bucket: &str,
    job_id: Uuid,
    pdf: Vec<u8>,
) -> Result<(), AppError> {
    let key = cover_letter_key(job_id);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Cover letter upload failed: {e}")))?;

    info!("Archived cover letter to s3://{bucket}/{key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_letter_key() {
        let id = Uuid::nil();
        assert_eq!(
            cover_letter_key(id),
            "cover-letters/00000000-0000-0000-0000-000000000000.pdf"
        );
    }
}
