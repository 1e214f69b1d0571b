/*!

This is the long-form manual for `marksheet_engine` and the `marksheet` command.

## Input layouts

The mark-sheet is a grid of cells, read from a CSV or an Excel file.

### `rows`

One row per student. The first non-blank row holds the column headers.

| Name | Roll No | English UT | English HY | Mathematics |
|------|---------|------------|------------|-------------|
| Asha | 1       | 18         | 61         | 80          |
| Ravi | 2       | AB         | 55         |             |

### `columns`

One column per student. The first non-blank column holds the field names.
Empty student columns are ignored.

|             | 1    | 2    |
|-------------|------|------|
| Name        | Asha | Ravi |
| Roll No     | 1    | 2    |
| English UT  | 18   | AB   |

Headers are matched with the template without regard to case or surrounding
spaces. When the same header appears twice, the last one is used.

Diagnostics always point to the original sheet: for a `columns` sheet, the
number of a student is its column number.

## Template file

The template describes the class: the identity fields, the subjects with
their components and maxima, the choice groups and the grading rules.

```json
{
  "templateName": "Class IX - Term 1",
  "orientation": "rows",
  "identityFields": [
    { "key": "name", "label": "Name", "header": "Name", "type": "string" },
    { "key": "roll", "label": "Roll No", "header": "Roll No", "type": "number" },
    { "key": "dob", "label": "Date of birth", "header": "DOB", "type": "date",
      "dateFormat": "%d/%m/%Y", "required": false }
  ],
  "subjects": [
    { "key": "eng", "label": "English", "maxMarks": 100,
      "components": ["UT", "HY"], "componentMax": { "UT": 20, "HY": 80 } },
    { "key": "math", "label": "Mathematics", "maxMarks": 100,
      "optional": true, "choiceGroup": "sci" },
    { "key": "bio", "label": "Biology", "maxMarks": 100,
      "optional": true, "choiceGroup": "sci", "columns": { "Total": "Bio" } }
  ],
  "choiceGroups": { "sci": { "min": 1, "max": 1, "label": "Science elective" } },
  "grading": {
    "passPercent": 33,
    "divisions": [
      { "name": "I", "threshold": 60 },
      { "name": "II", "threshold": 45 },
      { "name": "III", "threshold": 33 }
    ]
  }
}
```

A subject without `components` has a single component called `Total`. Without
`columns`, the column of a component is the subject label for a single
component, and `"<label> <component>"` otherwise. When `columns` is given,
the components it does not list are not read.

Custom subjects can be added with `--extra-subjects`, a file holding a JSON
array of subject objects. A choice group they refer to that the template
does not declare is created with `min = max = 1`.

## How a student is computed

1. The identity fields are read. A missing column stops the processing of
   the student; an empty value or a value of the wrong type is an error.
2. The subjects are selected. An optional subject with all its cells blank
   is ignored. A required subject with all its cells blank is an error.
3. The components of the selected subjects are scored. Blank cells and `AB`
   count as 0, with a warning. Non-numeric, negative and out-of-range marks
   are errors; out-of-range marks are kept as they are.
4. The choice groups are checked and the aggregate is computed. A student
   who fails one subject fails overall and gets no division.

Grades follow a fixed ladder on the percentage rounded to 2 decimals:

| Grade | Percentage |
|-------|------------|
| A1    | 91 - 100   |
| A2    | 81 - 90.99 |
| B1    | 71 - 80.99 |
| B2    | 61 - 70.99 |
| C1    | 51 - 60.99 |
| C2    | 41 - 50.99 |
| D     | 33 - 40.99 |
| E     | below 33   |

## Diagnostics

| Code                     | Severity | Scope |
|--------------------------|----------|-------|
| `structuralError`        | error    | sheet (row 0) |
| `missingColumn`          | error    | row   |
| `emptyRequiredField`     | error    | cell  |
| `typeMismatch`           | error    | cell  |
| `requiredSubjectBlank`   | error    | row   |
| `unmappedComponent`      | warning  | row   |
| `columnNotFound`         | error    | cell  |
| `blankTreatedAsZero`     | warning  | cell  |
| `absentTreatedAsZero`    | warning  | cell  |
| `nonNumericMark`         | error    | cell  |
| `negativeMark`           | error    | cell  |
| `exceedsComponentMax`    | error    | cell  |
| `subjectTotalExceedsMax` | error    | row   |
| `choiceGroupViolation`   | error    | row   |

A student with at least one error is flagged as blocked. Blocked students are
still computed, and are left out of the summary unless `--include-blocked`
is passed.

*/
