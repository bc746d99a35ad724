mod certificate;
mod common;
