use anyhow::{anyhow, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 流式 FASTA 读取器，按文件顺序逐条返回记录。
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    pending: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new(), pending: None, done: false }
    }

    /// 读一行，返回去掉行尾的内容；EOF 返回 None
    fn read_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            self.done = true;
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        let header = match self.pending.take() {
            Some(h) => h,
            None => loop {
                if self.done {
                    return Ok(None);
                }
                match self.read_line()? {
                    None => return Ok(None),
                    Some(l) if l.starts_with('>') => break l[1..].trim().to_string(),
                    Some(l) if l.trim().is_empty() => continue,
                    Some(l) => return Err(anyhow!("sequence data before first FASTA header: '{}'", l)),
                }
            },
        };

        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let mut seq = Vec::new();
        while !self.done {
            let Some(l) = self.read_line()? else { break };
            if let Some(h) = l.strip_prefix('>') {
                self.pending = Some(h.trim().to_string());
                break;
            }
            seq.extend(l.bytes().filter(|b| !b.is_ascii_whitespace()).map(|b| b.to_ascii_uppercase()));
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 读取整个 FASTA 文件，保持记录顺序
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow!("cannot open FASTA '{}': {}", path.display(), e))?;
    FastaReader::new(std::io::BufReader::new(fh)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_rna_records_in_order() {
        let data = b">tx1 5'UTR\nAUgcNN\n>tx2\nGGG\n>tx3\n";
        let recs: Vec<FastaRecord> = FastaReader::new(Cursor::new(&data[..])).collect::<Result<_>>().unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].id, "tx1");
        assert_eq!(recs[0].desc.as_deref(), Some("5'UTR"));
        assert_eq!(recs[0].seq, b"AUGCNN");
        assert_eq!(recs[1].id, "tx2");
        assert_eq!(recs[1].desc, None);
        assert_eq!(recs[1].seq, b"GGG");
        assert_eq!(recs[2].id, "tx3");
        assert!(recs[2].seq.is_empty());
    }

    #[test]
    fn parse_wrapped_crlf_with_blank_lines() {
        let data = b"\n\n>seq1 desc\r\nAC g u\r\n acgu\r\n\r\n>seq2 \r\n N N \r\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "seq1");
        assert_eq!(r1.seq, b"ACGUACGU");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "seq2");
        assert_eq!(r2.seq, b"NN");

        assert!(r.next_record().unwrap().is_none());
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn data_before_header_is_an_error() {
        let data = b"ACGU\n>x\nA\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        assert!(r.next_record().is_err());
    }
}
