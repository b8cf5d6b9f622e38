/*!

This is the long-form manual for `ward_metrics` and `wardtally`.

## Input layout

A report is read as an ordered sequence of tables. Each table is a list of rows
and each row a list of cells. Cells are compared after removing the regular and
non-breaking spaces around them.

The default layout is:

| table          | content                                                    |
|----------------|------------------------------------------------------------|
| 0              | ignored                                                    |
| 1              | totals: one row per ward, between a header and a total row |
| 2, 4, 6, ...   | header of race 1, 2, 3, ...                                |
| 3, 5, 7, ...   | votes of race 1, 2, 3, ...                                 |

### Totals table

```text
Ward,Name,Registered Voters - Total,Ballots Cast - Total
1,City of Milwaukee Ward 1,1502,1185
2,City of Milwaukee Ward 2,524,358
...
Total,550132,460300
```

The wards must be listed in order, from 1 to the declared number of wards, and
their ballots must add up to the declared number of ballots.

### Race header table

The first cell holds the name of the race. Every following row describes one
candidate: the first cell is `Name (Party)` and the fourth cell is the total of
the votes of this candidate.

The category of the race comes from the first phrase found in its name:

| phrase                           | category        |
|----------------------------------|-----------------|
| `President Vice President`       | Presidential    |
| `Representative in Congress`     | FederalHouse    |
| `State Senator`                  | StateSenate     |
| `Representative to the Assembly` | StateAssembly   |
| anything else                    | Minor           |

The party must be exactly `Democratic` or `Republican`. Any other party, for
example `Nonpartisan` for the write-ins, is grouped under `Other`.

### Race data table

The first row repeats the candidate names, from the third column onwards and in
the order of the header table. Every following row gives the ward id, the ward
name (not read) and the votes of each candidate. The last row is the
subtotal of the jurisdiction and is not read.

## Scores

For every ward with at least 40 ballots (the activity threshold):

- every count is expressed in parts-per-million of the ballots of the ward,
  truncated: 1 vote out of 3 ballots is 333333,
- a race without any democrat or republican vote is not counted,
- the presidential, congressional, state senate and assembly races fill their own
  columns; the minor races keep the highest value,
- `Average` is the mean of the contested congressional, state senate and
  assembly races. It is empty when the ward has no such race,
- `Maxes` is the highest value among the non-presidential columns,
- `logit` turns a (democrat, republican) pair into
  `round(ln(odds) * 10000 + 500000)` bounded to `[1, 999999]`, where the odds are
  those of the republican share. 500000 is an even split. It is empty when both
  values are 0,
- the turnout is the ballots in parts-per-million of the registered voters. It
  is empty when no voter is registered.

## Plot

The active wards are ordered by the chosen score (`logitAverage` by default,
wards without a score first), then by ward id. Every ward gets a bar with a
width proportional to its ballots. Each bar gets at least `minBarPixels`
(default 4) pixels, and one pixel line separates two bars.
The widths always add up to the width of the plot minus the separators.

## Configuration

`wardtally` takes a configuration file in JSON:

```json
{
  "jurisdiction": {
    "name": "Milwaukee County",
    "wardCount": 478,
    "ballotsCast": 460300,
    "raceCount": 35
  },
  "source": { "provider": "csv", "path": "tables" },
  "activityThreshold": 40,
  "plot": { "abscissaPixels": 10000, "minBarPixels": 4, "sortKey": "logitAverage" },
  "output": { "csvPath": "wards.csv", "plotPath": "plot.json", "summaryPath": "summary.json" }
}
```

Providers:
- `csv`: a directory of CSV files, one table per file, taken in the order of
  the file names (`table_000.csv`, `table_001.csv`, ...),
- `xlsx`: an Excel workbook, one table per worksheet, in the order of the
  worksheets.

The optional `layout` object moves the tables and columns: `totalsTable`,
`firstRaceTable`, `headerTotalColumn` and `firstVoteColumn` (all starting at 0).

Sort keys: `logitAverage`, `logitMaxes`, `turnout`.

 */
