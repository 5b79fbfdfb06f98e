/*!

This is the long-form manual for `roll_audit` and `rollaudit`.

## Row classes

Every row of the sheet (after the header) falls in exactly one class. The
checks are applied in this order and the first one that applies wins:

* `empty` every cell is null or only holds spaces.
* `junk` the text of the row contains one of the junk keywords, ignoring case.
  These are the titles, column headers, totals and signature lines that
  surround the voter records.
* `short` the text of the row has fewer characters than the short-row
  threshold (20 by default). These rows are dropped silently by the upload.
* `valid` the text holds an identity number: a run of 9 to 12 digits that is
  not part of a longer word or number. Only the first such number counts. The
  text before it is the name of the voter; if it is shorter than 2 characters
  the row is also reported as `missing_name`.
* `missing_id` anything else. These are the rows that the upload can only
  force-add with a placeholder identity number.

The text of the row is made of all the non-null cells, trimmed and joined with
single spaces, so the classification does not depend on the column layout.

## Duplicates

Identity numbers are compared as text. `012345678` and `12345678` are
different numbers. A number found on several rows is reported with all its
rows, the first one being the row that would be kept.

## Counts

The report only holds raw counts:

| count                  | meaning                                               |
|------------------------|-------------------------------------------------------|
| `total_rows`           | rows that are neither empty nor junk                  |
| `valid_count`          | rows with an identity number                          |
| `failed_count`         | `missing_id_count + missing_name_count`               |
| `skipped_count`        | short rows                                            |
| `distinct_id_count`    | different identity numbers, duplicated ones included  |
| `single_id_count`      | identity numbers found on exactly one row             |
| `duplicate_group_count`| identity numbers found on more than one row           |
| `duplicate_extra_rows` | rows whose identity number was already seen           |

The result file also lists the failed rows (with a `reason` and a
`reason_code`, `missing_id` or `missing_name`), the skipped rows, the junk rows
with the keyword that matched and the duplicated identity numbers.

Figures such as the number of records an upload is expected to keep depend
on the upload policy and are left to the reader.

## Input formats

* `xlsx` Excel workbooks. The first worksheet is used, unless the workbook has
  several worksheets, in which case the worksheet name is mandatory.
* `csv` Comma Separated Values. Rows may have different lengths.

Dates are written as `YYYY-MM-DD HH:MM:SS`. Cells keep their sheet column
even when the first columns of the sheet are empty.

The first row is the header. See `firstDataRowIndex` below to skip more rows.

## Configuration

`rollaudit` comes with defaults that match the voter rolls it was written for.
A configuration file in JSON may override them. Every field is optional.

```text
{
  "inputSettings": {
    "provider": "xlsx",
    "filePath": "kv22.xlsx",
    "excelWorksheetName": "Sheet1",
    "firstDataRowIndex": 2
  },
  "rules": {
    "junkKeywords": ["DANH SÁCH CỬ TRI", "UBND"],
    "minIdDigits": 9,
    "maxIdDigits": 12,
    "shortRowThreshold": 20,
    "minNameLength": 2,
    "idHeaderKeywords": ["cccd", "cmnd"]
  },
  "outputSettings": {
    "outputPath": "analysis_result_final.json",
    "previewCount": 10,
    "contentMaxChars": 200
  }
}
```

Paths are relative to the directory of the configuration file. Numbers may
also be given as strings. The options of the command line take precedence
over the configuration file.
 */
