use anyhow::{anyhow, Result};
use std::io::{Read, Write};
use std::path::Path;

/// 读取逐位点可及性表：每行一条序列，逗号分隔，行长可以不同。
pub fn read_accessibility<R: Read>(reader: R) -> Result<Vec<Vec<f32>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = rec
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.parse::<f32>()
                    .map_err(|e| anyhow!("line {}: invalid accessibility value '{}': {}", line + 1, f, e))
            })
            .collect::<Result<Vec<f32>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_accessibility_file<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f32>>> {
    let path = path.as_ref();
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow!("cannot open accessibility file '{}': {}", path.display(), e))?;
    read_accessibility(std::io::BufReader::new(fh))
        .map_err(|e| anyhow!("'{}': {}", path.display(), e))
}

/// 输出逗号分隔的数值矩阵，每行一条序列，按输入顺序。
pub fn write_matrix<W: Write>(writer: W, rows: &[Vec<f32>]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).flexible(true).from_writer(writer);
    for row in rows {
        wtr.write_record(row.iter().map(f32::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_matrix_file<P: AsRef<Path>>(path: P, rows: &[Vec<f32>]) -> Result<()> {
    let path = path.as_ref();
    let fh = std::fs::File::create(path)
        .map_err(|e| anyhow!("cannot create output '{}': {}", path.display(), e))?;
    write_matrix(std::io::BufWriter::new(fh), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_ragged_rows() {
        let data = b"0.1, 0.2,0.3\n1,2\n-1\n";
        let rows = read_accessibility(Cursor::new(&data[..])).unwrap();
        assert_eq!(rows, vec![vec![0.1, 0.2, 0.3], vec![1.0, 2.0], vec![-1.0]]);
    }

    #[test]
    fn read_rejects_non_numeric() {
        let data = b"0.1,x\n";
        let err = read_accessibility(Cursor::new(&data[..])).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn write_then_read_matrix() {
        let rows = vec![vec![0.5f32, 1.25, 0.0], vec![2.0]];
        let mut buf = Vec::new();
        write_matrix(&mut buf, &rows).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "0.5,1.25,0\n2\n");
        assert_eq!(read_accessibility(Cursor::new(buf)).unwrap(), rows);
    }
}
