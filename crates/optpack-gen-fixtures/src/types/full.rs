use optpack::{BoxError, Decoder, Encoder, MsgpackExt};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FullMsgpackExtType {
    pub a: i64,
    pub b: String,
}

impl MsgpackExt for FullMsgpackExtType {
    const EXT_TYPE: i8 = 1;

    fn marshal_msgpack(&self) -> Result<Vec<u8>, BoxError> {
        let mut enc = Encoder::new(Vec::new());
        enc.encode_i64(self.a)?;
        enc.encode_str(&self.b)?;
        Ok(enc.into_inner())
    }

    fn unmarshal_msgpack(&mut self, data: &[u8]) -> Result<(), BoxError> {
        let mut dec = Decoder::new(data);
        let a = dec.decode_i64()?;
        let b = dec.decode_string()?;
        if !dec.is_empty() {
            return Err(format!("{} trailing bytes", dec.remaining().len()).into());
        }
        self.a = a;
        self.b = b;
        Ok(())
    }
}
