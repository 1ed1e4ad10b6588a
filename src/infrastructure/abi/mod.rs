//! ABI infrastructure - felt decoding driven by a parsed catalog

mod byte_array;
mod decoder;
mod output;

pub use byte_array::{
    byte_array_candidate, byte_array_to_hex, hex_to_utf8, read_byte_array, BYTES_PER_WORD,
    MAX_PENDING_WORD_LEN, SHORT_BYTE_ARRAY_MAX_WORDS,
};
pub use decoder::{decode, param_key, CoreDecoder};
pub use output::{decode_event, decode_function_result, CatalogDecoder};
