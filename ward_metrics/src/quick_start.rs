/*!

# Quick start

This example runs `wardtally` end to end on a saved results page.

**Getting the tables** Open the results page in a browser and copy every table
into its own worksheet of a spreadsheet, keeping the order of the page. The first
worksheet can stay empty: the totals of the wards are expected on the second one.
Save the workbook in the **Excel format** (xlsx).

**Running** The default constants are those of Milwaukee County for the
3 November 2020 election (478 wards, 460300 ballots, 35 races):

```bash
wardtally -i 'results.xlsx' --input-type xlsx --out wards.csv --plot plot.json
```

Any other jurisdiction needs a configuration file with its own constants (see the
[configuration section](../manual/index.html#configuration)):

```bash
wardtally --config my_county.json --verbose
```

The program refuses to write anything if the tables do not add up: the ballots
of the wards must match the declared total and the votes of every candidate must
match its declared total. The log tells which table and which row went wrong.

```text
[2020-11-15T10:02:11Z INFO  ward_metrics::registry] read_wards: 478 wards, 460300 ballots cast
```

**Checking a run** A previous export can be given with `--reference`. The new
export is compared line by line and any difference is printed and fails the run.

*/
