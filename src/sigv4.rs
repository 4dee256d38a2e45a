//! AWS Signature Version 4 request signing
//!
//! Only what a single `InvokeModel` POST needs: header signing with an
//! optional session token. No presigned URLs, no chunked payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::trace;
use sha2::{Digest, Sha256};

use crate::config::AwsCredentials;
use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signing name of the Bedrock runtime service
pub const BEDROCK_SERVICE: &str = "bedrock";

/// SigV4 signer bound to one set of credentials and one region
#[derive(Debug, Clone)]
pub struct SigV4Signer
{   credentials: AwsCredentials
  , region: String
  , service: String
}

impl SigV4Signer
{   pub fn new(
      credentials: AwsCredentials
    , region: impl Into<String>
    , service: impl Into<String>
    ) -> Self
    {   SigV4Signer
        {   credentials
          , region: region.into()
          , service: service.into()
        }
    }

    /// Headers to attach to a request so AWS accepts it.
    ///
    /// `headers` are the headers the request already carries that should
    /// be covered by the signature. The returned map holds those plus
    /// `host`, `x-amz-date`, `x-amz-content-sha256`, the session token
    /// when present, and `authorization`.
    pub fn sign(
      &self
    , method: &str
    , url: &str
    , headers: &BTreeMap<String, String>
    , body: &[u8]
    , timestamp: DateTime<Utc>
    ) -> Result<BTreeMap<String, String>, Error>
    {   let parsed = url::Url::parse(url)
          .map_err(|e| Error::Failure(
            format!("Invalid URL {}: {}", url, e)
          ))?;
        let host = match (parsed.host_str(), parsed.port())
        {   (Some(h), Some(p)) => format!("{}:{}", h, p)
          , (Some(h), None) => h.to_string()
          , (None, _) => {
              return Err(Error::Failure(
                format!("Missing host in URL: {}", url)
              ));
            }
        };

        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = timestamp.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(body));

        // BTreeMap keeps lowercase names sorted as the canonical form needs
        let mut signed: BTreeMap<String, String> = headers
          .iter()
          .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
          .collect();
        signed.insert("host".to_string(), host);
        signed.insert("x-amz-date".to_string(), amz_date.clone());
        signed.insert(
          "x-amz-content-sha256".to_string(),
          payload_hash.clone()
        );
        if let Some(token) = &self.credentials.session_token
        {   signed.insert(
              "x-amz-security-token".to_string(),
              token.clone()
            );
        }

        let canonical_headers: String = signed
          .iter()
          .map(|(k, v)| format!("{}:{}\n", k, v))
          .collect();
        let signed_headers = signed
          .keys()
          .cloned()
          .collect::<Vec<_>>()
          .join(";");

        let canonical_request = format!(
          "{}\n{}\n{}\n{}\n{}\n{}",
          method.to_uppercase(),
          canonical_uri(parsed.path()),
          canonical_query(&parsed),
          canonical_headers,
          signed_headers,
          payload_hash
        );
        trace!("SigV4 canonical request:\n{}", canonical_request);

        let credential_scope = format!(
          "{}/{}/{}/aws4_request",
          date_stamp, self.region, self.service
        );
        let string_to_sign = format!(
          "{}\n{}\n{}\n{}",
          ALGORITHM,
          amz_date,
          credential_scope,
          hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = self.signature(&string_to_sign, &date_stamp)?;
        signed.insert(
          "authorization".to_string(),
          format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id,
            credential_scope,
            signed_headers,
            signature
          )
        );

        Ok(signed)
    }

    fn signature(
      &self
    , string_to_sign: &str
    , date_stamp: &str
    ) -> Result<String, Error>
    {   let k_date = hmac_sha256(
          format!("AWS4{}", self.credentials.secret_access_key)
            .as_bytes(),
          date_stamp.as_bytes()
        )?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
        Ok(hex::encode(
          hmac_sha256(&k_signing, string_to_sign.as_bytes())?
        ))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error>
{   let mut mac = HmacSha256::new_from_slice(key)
      .map_err(|e| Error::Failure(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Each segment of the (already encoded) path is encoded once more
fn canonical_uri(path: &str) -> String
{   if path.is_empty()
    {   return "/".to_string();
    }
    path.split('/')
      .map(|segment| urlencoding::encode(segment).into_owned())
      .collect::<Vec<_>>()
      .join("/")
}

fn canonical_query(url: &url::Url) -> String
{   let mut pairs: Vec<(String, String)> = url
      .query_pairs()
      .map(|(k, v)| (
        urlencoding::encode(&k).into_owned(),
        urlencoding::encode(&v).into_owned()
      ))
      .collect();
    pairs.sort();
    pairs
      .into_iter()
      .map(|(k, v)| format!("{}={}", k, v))
      .collect::<Vec<_>>()
      .join("&")
}
