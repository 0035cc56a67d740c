mod canonical;
mod signer;

pub use canonical::{
    AMZ_DATE_FORMAT, AMZ_DATE_HEADER, CanonicalRequest, content_type_for, format_amz_date,
};
pub use signer::{AUTHORIZATION_SCHEME, Signer, sign};
