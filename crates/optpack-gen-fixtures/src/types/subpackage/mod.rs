use optpack::BoxError;

/// Only reachable from the analyzed package through an alias.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Hidden {
    pub tag: u8,
    pub body: Vec<u8>,
}

impl Hidden {
    pub fn marshal_msgpack(&self) -> Result<Vec<u8>, BoxError> {
        let mut out = Vec::with_capacity(self.body.len() + 1);
        out.push(self.tag);
        out.extend_from_slice(&self.body);
        Ok(out)
    }

    pub fn unmarshal_msgpack(&mut self, data: &[u8]) -> Result<(), BoxError> {
        match data.split_first() {
            Some((&tag, body)) => {
                self.tag = tag;
                self.body = body.to_vec();
                Ok(())
            }
            None => Err("empty payload".into()),
        }
    }
}
