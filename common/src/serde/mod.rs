mod deserializer;

pub use deserializer::{Deserializer, ReadError, ReaderDeserializer, SliceDeserializer};
